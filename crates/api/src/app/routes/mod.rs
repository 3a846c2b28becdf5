use axum::{
    Router,
    routing::{delete, get, patch, post},
};

pub mod classes;
pub mod instructors;
pub mod payments;
pub mod students;
pub mod system;
pub mod tokens;
pub mod users;

/// Routes open to anyone.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/jwt", post(tokens::issue_token))
        .route("/users", post(users::create_user))
        .route("/users/:role/:subject", patch(users::assign_role))
        .route("/class", get(classes::list_classes).post(classes::create_class))
        .route("/class/:id", patch(classes::update_class_status))
        .route("/course", get(classes::list_instructor_courses))
        .route(
            "/feedback/:id",
            get(classes::get_feedback).put(classes::put_feedback),
        )
        .route("/instructors", get(instructors::list_instructors))
        .route("/popularinstructors", get(instructors::popular_instructors))
        .route(
            "/students",
            get(students::list_enrollments).post(students::create_enrollment),
        )
        .route("/students/:id", delete(students::delete_enrollment))
        .route("/payment/:id", get(students::get_enrollment))
}

/// Routes that require a verified bearer token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/:role/:subject", get(users::check_role))
        .route("/enroll", get(payments::list_enrolled))
        .route("/history", get(payments::payment_history))
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route("/payments", post(payments::record_payment))
}
