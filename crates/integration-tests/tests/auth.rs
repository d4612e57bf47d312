//! Registration, login, and gate behavior end to end.

#![allow(clippy::unwrap_used)]

use copperpot_client::gate::{self, AccessPolicy, GateDecision};
use copperpot_client::models::{Credentials, RegisterRequest};
use copperpot_core::Role;

use copperpot_integration_tests::MockShop;

#[tokio::test]
async fn test_register_establishes_customer_session() {
    let shop = MockShop::spawn().await;
    let state = shop.app_state();

    let response = state
        .api()
        .register(&RegisterRequest {
            firstname: "Sam".to_owned(),
            lastname: "Shopper".to_owned(),
            email: "sam@example.com".to_owned(),
            password: "hunter22".to_owned(),
        })
        .await
        .unwrap();

    // The service still answers with the legacy "USER" role string; the
    // session store is the one normalization point.
    assert_eq!(response.role, "USER");
    state
        .sessions()
        .login(
            &response.token,
            &response.role,
            &response.firstname,
            &response.lastname,
        )
        .unwrap();

    let session = state.sessions().current().unwrap();
    assert_eq!(session.role, Role::Customer);
    assert_eq!(
        gate::evaluate(state.sessions(), AccessPolicy::RequireAuth),
        GateDecision::Allow
    );
    assert_eq!(
        gate::evaluate(state.sessions(), AccessPolicy::RequireAdmin),
        GateDecision::RedirectToLanding,
        "customer with a valid token lands on the shop, not the login view"
    );
}

#[tokio::test]
async fn test_admin_login_opens_admin_views() {
    let shop = MockShop::spawn().await;
    let state = shop.app_state();

    let response = state
        .api()
        .authenticate(&Credentials {
            email: "admin@example.com".to_owned(),
            password: "hunter22".to_owned(),
        })
        .await
        .unwrap();
    state
        .sessions()
        .login(
            &response.token,
            &response.role,
            &response.firstname,
            &response.lastname,
        )
        .unwrap();

    assert_eq!(state.sessions().current().unwrap().role, Role::Admin);
    assert_eq!(
        gate::evaluate(state.sessions(), AccessPolicy::RequireAdmin),
        GateDecision::Allow
    );
}

#[tokio::test]
async fn test_logout_gates_protected_views_on_next_navigation() {
    let shop = MockShop::spawn().await;
    let state = shop.app_state();
    state.sessions().login("tok", "ADMIN", "Ada", "L").unwrap();

    assert_eq!(
        gate::evaluate(state.sessions(), AccessPolicy::RequireAdmin),
        GateDecision::Allow
    );

    state.sessions().logout().unwrap();
    assert_eq!(
        gate::evaluate(state.sessions(), AccessPolicy::RequireAuth),
        GateDecision::RedirectToLogin
    );
    assert_eq!(
        gate::evaluate(state.sessions(), AccessPolicy::RequireAdmin),
        GateDecision::RedirectToLogin
    );
}
