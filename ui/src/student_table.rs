use dioxus::prelude::*;
use jiff::Timestamp;
use types::Student;

/// Birthday as shown in the table, `-` when unknown.
pub fn format_birthday(birthday: Option<Timestamp>) -> String {
    birthday
        .map(|ts| ts.strftime("%b %d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn StudentTable(students: Vec<Student>) -> Element {
    rsx! {
        div { class: "card",
            div { class: "table-container",
                table {
                    thead {
                        tr {
                            th { "Name" }
                            th { "Email" }
                            th { "Birthday" }
                        }
                    }
                    tbody {
                        if students.is_empty() {
                            tr {
                                td { colspan: "3", class: "text-muted", "No students" }
                            }
                        }
                        for student in students.iter() {
                            tr { key: "{student.id}",
                                td { "{student.name}" }
                                td { "{student.email}" }
                                td { {format_birthday(student.birthday)} }
                            }
                        }
                    }
                }
            }
        }
    }
}
