use coursecal_db::model::content::{ContentItem, ItemTitle};

/// ## Summary
/// Composes the display summary of an event.
///
/// Assignments and articles read `[CODE] Course — Title`; chapters read
/// `[CODE] Course — Chapter N — Book`.
#[must_use]
pub fn compose_summary(item: &ContentItem) -> String {
    let course = &item.course;
    match &item.title {
        ItemTitle::Titled(title) => format!("[{}] {} — {title}", course.code, course.name),
        ItemTitle::Chapter { number, book_title } => format!(
            "[{}] {} — Chapter {number} — {book_title}",
            course.code, course.name
        ),
    }
}
