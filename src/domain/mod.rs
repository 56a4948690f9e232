/// Post, user and billing operations on top of the record store

mod billing;
mod posts;
mod profanity;
mod users;

pub use billing::{apply_billing_event, BillingEvent, BillingEventData, USER_UPGRADED};
pub use posts::{create_post, delete_post, get_post, list_posts};
pub use profanity::mask_profanity;
pub use users::{register_user, update_credentials};
