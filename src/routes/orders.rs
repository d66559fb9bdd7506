//! Order routes.
//!
//! GET    /order                - List every order
//! GET    /orderWithPaginate    - One page of orders
//! GET    /orderGetDetail/{id}  - A single order (bare, not enveloped)
//! POST   /order/insert         - Create an order owned by the caller
//! PUT    /order/update/{id}    - Replace name, quantity and price
//! DELETE /order/delete/{id}    - Delete an order
//! POST   /orderSearchbyName    - Orders whose name contains `name`

use axum::Router;

use super::resources::{self, ResourceState};
use crate::models::Order;
use crate::state::AppState;

/// Build the orders router.
pub fn router(state: &AppState) -> Router {
    resources::router::<Order>(ResourceState {
        repo: state.orders.clone(),
        app_url: state.app_url.clone(),
        page_size: state.page_size,
    })
}
