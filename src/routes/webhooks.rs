use actix_web::{web, HttpResponse};

use crate::domain::{apply_billing_event, BillingEvent};
use crate::error::{AppError, ErrorContext};
use crate::middleware::PolkaApiKey;
use crate::store::Store;

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. Answers 204 for handled and
/// ignored events alike; 404 if an upgrade names an unknown user.
pub async fn polka_webhook(
    _key: PolkaApiKey,
    event: web::Json<BillingEvent>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("billing_event").with_user_id(event.data.user_id);

    apply_billing_event(store.get_ref(), &event).map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::NoContent().finish())
}
