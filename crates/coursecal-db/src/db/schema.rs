//! Diesel table definitions, kept in step with `migrations/`.

diesel::table! {
    app_user (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    course (id) {
        id -> Uuid,
        code -> Text,
        name -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    enrollment (user_id, course_id) {
        user_id -> Uuid,
        course_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    assignment (id) {
        id -> Uuid,
        course_id -> Uuid,
        title -> Text,
        deadline -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    article (id) {
        id -> Uuid,
        course_id -> Uuid,
        title -> Text,
        deadline -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    book (id) {
        id -> Uuid,
        course_id -> Uuid,
        title -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    chapter (id) {
        id -> Uuid,
        book_id -> Uuid,
        chapter_number -> Int4,
        deadline -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    calendar_event (uid) {
        uid -> Text,
        user_id -> Uuid,
        kind -> Text,
        source_id -> Uuid,
        summary -> Text,
        deadline -> Nullable<Timestamptz>,
        completed -> Bool,
        revision -> Int4,
        last_modified -> Timestamptz,
        cancelled_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    calendar_token (token) {
        token -> Text,
        user_id -> Uuid,
        created_at -> Timestamptz,
        last_used_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(enrollment -> app_user (user_id));
diesel::joinable!(enrollment -> course (course_id));
diesel::joinable!(assignment -> course (course_id));
diesel::joinable!(article -> course (course_id));
diesel::joinable!(book -> course (course_id));
diesel::joinable!(chapter -> book (book_id));
diesel::joinable!(calendar_event -> app_user (user_id));
diesel::joinable!(calendar_token -> app_user (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    app_user,
    course,
    enrollment,
    assignment,
    article,
    book,
    chapter,
    calendar_event,
    calendar_token,
);
