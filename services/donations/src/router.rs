use axum::{
    Router,
    routing::{get, post},
};

use charity_core::health::{healthz, readyz};
use charity_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    account::{
        activate, change_password, edit_profile, login, logout, register, resend_activation,
    },
    admin::{
        admin_index, assign_courier, create_entry, delete_rows, export_csv, list_rows,
        set_donation_status,
    },
    contact::{contact, report_problem},
    donation::{create_donation, donation_form, form_success},
    home::home,
    password_reset::{confirm_password_reset, request_password_reset},
    profile::{get_profile, toggle_taken_by_user},
    report::get_reports,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // Public site
        .route("/", get(home))
        .route("/add_donation/", get(donation_form).post(create_donation))
        .route("/form_success/", get(form_success))
        .route("/contact/", post(contact))
        .route("/report_problem/", post(report_problem))
        // Accounts
        .route("/register/", post(register))
        .route("/login/", post(login))
        .route("/logout/", get(logout).post(logout))
        .route("/activate/{uidb64}/{token}/", get(activate))
        .route("/activation/resend/", post(resend_activation))
        .route("/password_reset/", post(request_password_reset))
        .route(
            "/password_reset_confirm/{uidb64}/{token}/",
            post(confirm_password_reset),
        )
        .route("/user_profile/", get(get_profile).post(toggle_taken_by_user))
        .route("/edit_profile/", post(edit_profile))
        .route("/change_password/", post(change_password))
        // Admin console
        .route("/admin/", get(admin_index))
        .route("/admin/reports/", get(get_reports))
        .route("/admin/{resource}/", get(list_rows).post(create_entry))
        .route("/admin/{resource}/export/", get(export_csv))
        .route("/admin/{resource}/delete/", post(delete_rows))
        .route("/admin/{resource}/{id}/status/", post(set_donation_status))
        .route("/admin/{resource}/{id}/courier/", post(assign_courier))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
