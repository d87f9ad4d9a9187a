use futures_util::{FutureExt, Stream, future::LocalBoxFuture, stream::FuturesUnordered};
use types::{Guardian, Result, Student};

use crate::{Menu, QueryLayer};

/// Identifies one load of the guardian page: the inputs it was started with and
/// a generation that increases every time the inputs change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadScope {
    pub generation: u64,
    pub owner_id: String,
    pub guardian_id: String,
}

#[derive(Debug)]
pub enum Fetched {
    Guardians(Result<Vec<Guardian>>),
    Students(Result<Vec<Student>>),
}

/// A settled fetch, tagged with the scope that started it.
#[derive(Debug)]
pub struct Loaded {
    pub scope: LoadScope,
    pub fetched: Fetched,
}

/// Start both fetches for `scope`.
///
/// Items are yielded in completion order, so the caller can apply the first
/// result while the other request is still in flight.
pub fn load<Q: QueryLayer>(
    query: &Q,
    scope: LoadScope,
) -> impl Stream<Item = Loaded> + 'static {
    let guardians = {
        let scope = scope.clone();
        query
            .guardian_list(scope.owner_id.clone())
            .map(move |res| Loaded {
                scope,
                fetched: Fetched::Guardians(res),
            })
    };
    let students = query
        .students_for_table(scope.guardian_id.clone())
        .map(move |res| Loaded {
            scope,
            fetched: Fetched::Students(res),
        });

    [guardians.boxed_local(), students.boxed_local()]
        .into_iter()
        .collect::<FuturesUnordered<LocalBoxFuture<'static, Loaded>>>()
}

/// Everything the guardian page renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    loading: bool,
    guardians: Vec<Guardian>,
    students: Vec<Student>,
    pub menu: Menu,
    generation: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            loading: true,
            guardians: Vec::new(),
            students: Vec::new(),
            menu: Menu::Closed,
            generation: 0,
        }
    }
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the first fetch of any scope has settled.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn guardians(&self) -> &[Guardian] {
        &self.guardians
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Open a new load scope. Results from earlier scopes are ignored from now on.
    ///
    /// Data from the previous scope stays visible until the new results land.
    pub fn begin(
        &mut self,
        owner_id: impl Into<String>,
        guardian_id: impl Into<String>,
    ) -> LoadScope {
        self.generation += 1;
        LoadScope {
            generation: self.generation,
            owner_id: owner_id.into(),
            guardian_id: guardian_id.into(),
        }
    }

    /// Apply a settled fetch. Returns false if it belonged to a stale scope.
    ///
    /// Failures keep the previous list and are only logged. Either fetch
    /// settling clears the loading flag, even while the other one is pending.
    pub fn apply(&mut self, loaded: Loaded) -> bool {
        let Loaded { scope, fetched } = loaded;

        if scope.generation != self.generation {
            tracing::debug!(
                generation = scope.generation,
                current = self.generation,
                "ignoring result of a stale load"
            );
            return false;
        }

        match fetched {
            Fetched::Guardians(Ok(guardians)) => self.guardians = guardians,
            Fetched::Guardians(Err(error)) => {
                tracing::error!(%error, owner_id = %scope.owner_id, "error fetching guardians");
            }
            Fetched::Students(Ok(students)) => self.students = students,
            Fetched::Students(Err(error)) => {
                tracing::error!(
                    %error,
                    guardian_id = %scope.guardian_id,
                    "error fetching students"
                );
            }
        }
        self.loading = false;

        true
    }

    /// Name of the guardian with `guardian_id` for the breadcrumb trigger, or an
    /// empty string if it is not listed.
    pub fn breadcrumb_label(&self, guardian_id: &str) -> &str {
        self.guardians
            .iter()
            .find(|g| g.id == guardian_id)
            .map(|g| g.name.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

    use futures_util::{StreamExt, future};
    use tokio::sync::oneshot;
    use types::{Account, err};

    use super::*;

    fn account(id: &str, name: &str) -> Account {
        Account {
            id: id.into(),
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            birthday: None,
        }
    }

    enum Reply {
        Ready(Result<Vec<Account>>),
        Pending,
        Later(oneshot::Receiver<Result<Vec<Account>>>),
    }

    impl Reply {
        fn resolve(self) -> LocalBoxFuture<'static, Result<Vec<Account>>> {
            match self {
                Reply::Ready(res) => future::ready(res).boxed_local(),
                Reply::Pending => future::pending().boxed_local(),
                Reply::Later(rx) => rx
                    .map(|res| res.unwrap_or_else(|_| Err(err!("sender dropped"))))
                    .boxed_local(),
            }
        }
    }

    /// Query layer answering from per-id scripted replies.
    #[derive(Clone, Default)]
    struct Scripted {
        guardians: Rc<RefCell<HashMap<String, Reply>>>,
        students: Rc<RefCell<HashMap<String, Reply>>>,
    }

    impl Scripted {
        fn guardians(self, owner_id: &str, reply: Reply) -> Self {
            self.guardians.borrow_mut().insert(owner_id.into(), reply);
            self
        }

        fn students(self, guardian_id: &str, reply: Reply) -> Self {
            self.students.borrow_mut().insert(guardian_id.into(), reply);
            self
        }
    }

    impl QueryLayer for Scripted {
        fn guardian_list(
            &self,
            owner_id: String,
        ) -> impl Future<Output = Result<Vec<Guardian>>> + 'static {
            self.guardians
                .borrow_mut()
                .remove(&owner_id)
                .unwrap_or(Reply::Pending)
                .resolve()
        }

        fn students_for_table(
            &self,
            guardian_id: String,
        ) -> impl Future<Output = Result<Vec<Student>>> + 'static {
            self.students
                .borrow_mut()
                .remove(&guardian_id)
                .unwrap_or(Reply::Pending)
                .resolve()
        }
    }

    async fn drain(state: &mut PageState, stream: impl Stream<Item = Loaded>) {
        let mut stream = std::pin::pin!(stream);
        while let Some(loaded) = stream.next().await {
            state.apply(loaded);
        }
    }

    #[test]
    fn initial_state() {
        let state = PageState::new();
        assert!(state.is_loading());
        assert!(state.guardians().is_empty());
        assert!(state.students().is_empty());
        assert_eq!(state.menu, Menu::Closed);
    }

    #[tokio::test]
    async fn label_and_table_from_both_fetches() {
        let query = Scripted::default()
            .guardians("admin", Reply::Ready(Ok(vec![account("g1", "Alice")])))
            .students("g1", Reply::Ready(Ok(vec![account("s1", "Bob")])));
        let mut state = PageState::new();

        let scope = state.begin("admin", "g1");
        drain(&mut state, load(&query, scope)).await;

        assert!(!state.is_loading());
        assert_eq!(state.breadcrumb_label("g1"), "Alice");
        assert_eq!(state.students().len(), 1);
        assert_eq!(state.students()[0].name, "Bob");
    }

    #[tokio::test]
    async fn loading_clears_after_first_settled_fetch() {
        let query = Scripted::default()
            .guardians("admin", Reply::Ready(Ok(vec![account("g1", "Alice")])))
            .students("g1", Reply::Pending);
        let mut state = PageState::new();

        let scope = state.begin("admin", "g1");
        let mut stream = std::pin::pin!(load(&query, scope));

        let first = stream.next().await.unwrap();
        assert!(matches!(first.fetched, Fetched::Guardians(Ok(_))));
        state.apply(first);

        assert!(!state.is_loading());
        assert!(state.students().is_empty());
        assert!(
            tokio::time::timeout(Duration::from_millis(20), stream.next())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn guardian_failure_keeps_students() {
        let query = Scripted::default()
            .guardians("admin", Reply::Ready(Err(err!("permission denied"))))
            .students("g1", Reply::Ready(Ok(vec![account("s1", "Bob")])));
        let mut state = PageState::new();

        let scope = state.begin("admin", "g1");
        drain(&mut state, load(&query, scope)).await;

        assert!(!state.is_loading());
        assert!(state.guardians().is_empty());
        assert_eq!(state.breadcrumb_label("g1"), "");
        assert_eq!(state.students(), &[account("s1", "Bob")]);
    }

    #[tokio::test]
    async fn failure_keeps_previous_value() {
        let query = Scripted::default()
            .guardians("admin", Reply::Ready(Ok(vec![account("g1", "Alice")])))
            .students("g1", Reply::Ready(Ok(vec![account("s1", "Bob")])));
        let mut state = PageState::new();
        let scope = state.begin("admin", "g1");
        drain(&mut state, load(&query, scope)).await;

        let query = query
            .guardians("admin", Reply::Ready(Err(err!("unavailable"))))
            .students("g1", Reply::Ready(Err(err!("unavailable"))));
        let scope = state.begin("admin", "g1");
        drain(&mut state, load(&query, scope)).await;

        assert_eq!(state.guardians(), &[account("g1", "Alice")]);
        assert_eq!(state.students(), &[account("s1", "Bob")]);
    }

    #[tokio::test]
    async fn late_result_of_previous_guardian_is_ignored() {
        let (tx_g1, rx_g1) = oneshot::channel();
        let query = Scripted::default()
            .guardians("admin", Reply::Ready(Ok(vec![account("g1", "Alice")])))
            .students("g1", Reply::Later(rx_g1));
        let mut state = PageState::new();

        let first = state.begin("admin", "g1");
        let mut stale = std::pin::pin!(load(&query, first));
        let loaded = stale.next().await.unwrap();
        assert!(state.apply(loaded));

        // Route changes to g2 before the g1 students arrive.
        let query = query
            .guardians(
                "admin",
                Reply::Ready(Ok(vec![account("g1", "Alice"), account("g2", "Carol")])),
            )
            .students("g2", Reply::Ready(Ok(vec![account("s2", "Dan")])));
        let second = state.begin("admin", "g2");
        drain(&mut state, load(&query, second)).await;

        tx_g1.send(Ok(vec![account("s1", "Bob")])).unwrap();
        let late = stale.next().await.unwrap();
        assert!(!state.apply(late));

        assert_eq!(state.breadcrumb_label("g2"), "Carol");
        assert_eq!(state.students(), &[account("s2", "Dan")]);
    }

    #[test]
    fn label_for_unknown_guardian_is_empty() {
        let mut state = PageState::new();
        assert_eq!(state.breadcrumb_label("g1"), "");

        state.guardians = vec![account("g1", "Alice"), account("g2", "Carol")];

        assert_eq!(state.breadcrumb_label("g1"), "Alice");
        assert_eq!(state.breadcrumb_label("g2"), "Carol");
        assert_eq!(state.breadcrumb_label("g3"), "");
    }
}
