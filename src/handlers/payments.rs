use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::orders::OrderResponse;
use super::parse_money;
use crate::application::order_workflow::OrderWorkflow;
use crate::domain::context::RequestContext;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    pub order_id: Uuid,
    /// Amount the client expects to pay, as a decimal string. Must equal the
    /// order total when present.
    pub amount: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResultRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResultResponse {
    pub message: String,
    pub order: OrderResponse,
}

/// POST /create-payment-intent
///
/// Asks the card processor for a payment intent covering the order total.
/// The returned client secret is used by the browser to confirm the card.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = PaymentIntentResponse),
        (status = 400, description = "Order cannot be paid by card"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Payment processing not configured"),
        (status = 502, description = "Payment processor failed"),
    ),
    tag = "payments"
)]
pub async fn create_payment_intent(
    workflow: web::Data<OrderWorkflow>,
    ctx: RequestContext,
    body: web::Json<CreatePaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let amount = body
        .amount
        .as_deref()
        .map(|a| parse_money("amount", a))
        .transpose()?;

    let wf = workflow.clone();
    let request = web::block(move || wf.prepare_card_payment(&ctx, body.order_id, amount))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let intent = workflow.initiate_card_payment(request).await?;

    Ok(HttpResponse::Ok().json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// POST /payment-success
///
/// Called after the processor confirmed the card on the client. Marks the
/// order paid; repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/payment-success",
    request_body = PaymentResultRequest,
    responses(
        (status = 200, description = "Payment confirmed", body = PaymentResultResponse),
        (status = 400, description = "Order cannot be confirmed"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Order not found"),
    ),
    tag = "payments"
)]
pub async fn payment_success(
    workflow: web::Data<OrderWorkflow>,
    ctx: RequestContext,
    body: web::Json<PaymentResultRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = body.into_inner().order_id;

    let order = web::block(move || workflow.confirm_card_payment(&ctx, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PaymentResultResponse {
        message: "Payment confirmed".to_string(),
        order: order.into(),
    }))
}

/// POST /payment-failure
///
/// Records that the processor declined or failed the card confirmation.
#[utoipa::path(
    post,
    path = "/payment-failure",
    request_body = PaymentResultRequest,
    responses(
        (status = 200, description = "Payment marked failed", body = PaymentResultResponse),
        (status = 400, description = "Order is already paid"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Order not found"),
    ),
    tag = "payments"
)]
pub async fn payment_failure(
    workflow: web::Data<OrderWorkflow>,
    ctx: RequestContext,
    body: web::Json<PaymentResultRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = body.into_inner().order_id;

    let order = web::block(move || workflow.fail_card_payment(&ctx, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PaymentResultResponse {
        message: "Payment failed".to_string(),
        order: order.into(),
    }))
}
