use std::future::Future;

use types::{Guardian, Result, Student};

/// The backend queries the guardian page depends on.
///
/// Returned futures own their inputs so they can outlive the caller's borrow.
pub trait QueryLayer: Clone + 'static {
    fn guardian_list(
        &self,
        owner_id: String,
    ) -> impl Future<Output = Result<Vec<Guardian>>> + 'static;

    fn students_for_table(
        &self,
        guardian_id: String,
    ) -> impl Future<Output = Result<Vec<Student>>> + 'static;
}
