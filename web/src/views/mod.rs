mod login;
pub use login::Login;

mod guardians;
pub use guardians::Guardians;

mod guardian_students;
pub use guardian_students::GuardianStudents;
