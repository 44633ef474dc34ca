//! REST API.
//!
//! | Method | Path               | Handler                          |
//! |--------|--------------------|----------------------------------|
//! | GET    | `/users`           | list users, optional `?name=`    |
//! | GET    | `/users/{user_id}` | fetch one user                   |
//! | POST   | `/users`           | create a user                    |
//! | GET    | `/orgs`            | list organizations               |
//! | POST   | `/orgs`            | create an organization           |
//! | POST   | `/permissions`     | bulk upsert permissions          |
//! | DELETE | `/permissions`     | bulk delete permissions          |
//! | GET    | `/docs`            | interactive API documentation    |
//! | GET    | `/openapi.json`    | OpenAPI document                 |
//! | GET    | `/health`          | liveness probe                   |

pub mod docs;
pub mod error;
pub mod routes;
pub mod state;

pub use docs::ApiDoc;
pub use error::{ApiError, ApiResult};
pub use routes::{create_router, create_router_with_limits};
pub use state::AppState;

#[cfg(test)]
mod tests;
