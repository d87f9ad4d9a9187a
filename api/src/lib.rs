use dioxus::prelude::*;
use types::{Guardian, Student, UserSession};

#[post("/api/current-user")]
pub async fn get_current_user() -> ServerFnResult<Option<UserSession>> {
    match server::get_session_from_cookie().await {
        Ok(session) => Ok(Some(session)),
        Err(_) => Ok(None),
    }
}

#[post("/api/guardians")]
pub async fn list_guardians(owner_id: String) -> ServerFnResult<Vec<Guardian>> {
    server::require_owner(&owner_id).await?;
    let guardians = server::store()?.list_guardians(&owner_id).await?;
    tracing::debug!(%owner_id, count = guardians.len(), "listed guardians");
    Ok(guardians)
}

#[post("/api/students")]
pub async fn list_students(guardian_id: String) -> ServerFnResult<Vec<Student>> {
    server::require_guardian_owner(&guardian_id).await?;
    let students = server::store()?.list_students(&guardian_id).await?;
    tracing::debug!(%guardian_id, count = students.len(), "listed students");
    Ok(students)
}
