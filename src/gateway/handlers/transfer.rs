//! Transfer intake: validate, enqueue, report submission.
//!
//! Submission is not settlement. A 201 here means the message is on the
//! queue; the consumer decides acceptance later. Intake never retries a
//! failed publish — a caller that resubmits mints a new messageId.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionRecord;
use crate::message::{self, TransferMessage};
use crate::user_auth::Claims;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, created, ok};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitTransferRequest {
    // Wire spelling is a frozen contract, same as on the queue message.
    #[serde(
        rename = "ammount",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    pub amount: Decimal,
    pub to: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
}

/// POST /transactions
pub async fn submit_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitTransferRequest>,
) -> ApiResult<SubmitResponse> {
    state.metrics.incr_transfers_submitted();

    let from = claims
        .sub
        .parse::<i64>()
        .map_err(|_| ApiError::unauthorized("Invalid user ID in token"))?;

    if req.amount <= Decimal::ZERO || !message::amount_in_bounds(&req.amount) {
        return ApiError::bad_request(format!(
            "amount must be positive, with at most {} integer and {} fractional digits",
            message::MAX_INTEGER_DIGITS,
            message::MAX_FRACTIONAL_DIGITS
        ))
        .into_err();
    }

    // Courtesy existence check. Not a correctness guarantee: the consumer
    // re-checks inside the unit of work. Accounts are never deleted, so a
    // positive answer here cannot go stale.
    match state.ledger.account_exists(req.to).await {
        Ok(true) => {}
        Ok(false) => {
            return ApiError::not_found(format!("recipient account {} does not exist", req.to))
                .into_err();
        }
        Err(e) => {
            tracing::error!(error = %e, "Recipient lookup failed");
            return ApiError::db_error("could not verify recipient").into_err();
        }
    }

    let msg = TransferMessage::new(from, req.to, req.amount);

    // Assert the schema before publishing. The consumer asserts the same
    // schema on its side.
    let payload = match msg.encode() {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Outbound message failed schema check");
            return ApiError::internal("could not encode transfer message").into_err();
        }
    };

    if let Err(e) = state.queue.publish(&state.queue_name, &payload).await {
        tracing::error!(error = %e, "Publish failed");
        return ApiError::internal("could not enqueue transfer").into_err();
    }

    state.metrics.incr_messages_sent();
    tracing::info!(message_id = %msg.message_id, from, to = req.to, "Sent transfer message");

    created(SubmitResponse {
        status: "submitted",
    })
}

/// GET /transactions — every record where the caller is sender or receiver.
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<TransactionsResponse> {
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| ApiError::unauthorized("Invalid user ID in token"))?;

    match state.ledger.transactions_for(user_id).await {
        Ok(transactions) => ok(TransactionsResponse { transactions }),
        Err(e) => {
            tracing::error!(error = %e, "Transaction history query failed");
            ApiError::db_error("could not load transactions").into_err()
        }
    }
}
