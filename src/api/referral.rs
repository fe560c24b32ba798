// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, warn};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{ClaimReferralRequest, ClaimReferralResponse, ErrorResponse, ReferralCodeResponse},
    referral::{MSG_CLAIMED, MSG_INVALID_CODE},
    session::Session,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/referral",
    tag = "Referral",
    responses(
        (status = 200, body = ReferralCodeResponse),
        (status = 401, body = ErrorResponse),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn get_referral(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ReferralCodeResponse>, ApiError> {
    let code = state.referrals.fetch_own(&user.address).await?;
    Ok(Json(ReferralCodeResponse {
        success: true,
        data: code.map(|c| c.into_inner()),
    }))
}

#[utoipa::path(
    post,
    path = "/api/referral",
    request_body = ClaimReferralRequest,
    tag = "Referral",
    responses(
        (status = 200, body = ClaimReferralResponse),
        (status = 401, body = ErrorResponse),
        (status = 409, body = ErrorResponse),
        (status = 422, body = ErrorResponse),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn claim_referral(
    Auth(user): Auth,
    State(state): State<AppState>,
    mut session: Session,
    payload: Result<Json<ClaimReferralRequest>, JsonRejection>,
) -> Result<(Session, Json<ClaimReferralResponse>), ApiError> {
    // A missing or unreadable code is the same validation failure as a bad one.
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected referral claim body");
        ApiError::unprocessable(MSG_INVALID_CODE)
    })?;
    state.referrals.claim(&user.address, &request.code).await?;

    // Refresh the cached flag on the caller's own session.
    if session.identity() == Some(user.address.as_str()) && !session.record().has_referral {
        let mut record = session.record().clone();
        record.has_referral = true;
        if let Err(e) = session.save(record, state.now_millis()) {
            warn!(error = %e, "Failed to refresh session after referral claim");
        }
    }

    Ok((
        session,
        Json(ClaimReferralResponse {
            success: true,
            message: MSG_CLAIMED.to_string(),
        }),
    ))
}
