//! Customer routes.
//!
//! GET    /customer                - List every customer
//! GET    /customerWithPaginate    - One page of customers
//! GET    /customerGetDetail/{id}  - A single customer (bare, not enveloped)
//! POST   /customer/insert         - Create a customer owned by the caller
//! PUT    /customer/update/{id}    - Replace name, address and phone
//! DELETE /customer/delete/{id}    - Delete a customer
//! POST   /customerSearchbyName    - Customers whose name contains `name`

use axum::Router;

use super::resources::{self, ResourceState};
use crate::models::Customer;
use crate::state::AppState;

/// Build the customers router.
pub fn router(state: &AppState) -> Router {
    resources::router::<Customer>(ResourceState {
        repo: state.customers.clone(),
        app_url: state.app_url.clone(),
        page_size: state.page_size,
    })
}
