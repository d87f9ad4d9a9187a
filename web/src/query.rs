use std::future::Future;

use types::{Error, Guardian, Result, Student};
use ui::QueryLayer;

/// Queries answered by the `api` server functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerQuery;

impl QueryLayer for ServerQuery {
    fn guardian_list(
        &self,
        owner_id: String,
    ) -> impl Future<Output = Result<Vec<Guardian>>> + 'static {
        async move {
            api::list_guardians(owner_id)
                .await
                .map_err(|e| Error::from(e.to_string()))
        }
    }

    fn students_for_table(
        &self,
        guardian_id: String,
    ) -> impl Future<Output = Result<Vec<Student>>> + 'static {
        async move {
            api::list_students(guardian_id)
                .await
                .map_err(|e| Error::from(e.to_string()))
        }
    }
}
