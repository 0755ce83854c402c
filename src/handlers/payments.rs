//! Monthly payment calculator.
//!
//! Standard amortization: `P * r / (1 - (1 + r)^-n)` with `r` the monthly
//! rate, falling back to `P / n` at 0% APR.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FinancingConfig;
use crate::dispatch::HandlerError;
use crate::handlers::read_json;
use crate::http::response::ResponseSink;

/// Body of `POST /api/payments/calculate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub price: f64,
    #[serde(default)]
    pub down_payment: f64,
    #[serde(default)]
    pub trade_in: f64,
    pub apr: Option<f64>,
    pub term_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub monthly_payment: f64,
    pub amount_financed: f64,
    pub total_interest: f64,
    pub total_cost: f64,
    pub apr: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    #[error("price must be a positive number")]
    InvalidPrice,

    #[error("down payment and trade-in must not be negative")]
    NegativeCredit,

    #[error("apr must be between 0 and {0}")]
    InvalidApr(f64),

    #[error("term of {0} months is not offered")]
    InvalidTerm(u32),
}

#[derive(Debug, Clone)]
pub struct PaymentCalculator {
    financing: FinancingConfig,
}

impl PaymentCalculator {
    pub fn new(financing: FinancingConfig) -> Self {
        Self { financing }
    }

    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        if !request.price.is_finite() || request.price <= 0.0 {
            return Err(QuoteError::InvalidPrice);
        }
        if request.down_payment < 0.0 || request.trade_in < 0.0 {
            return Err(QuoteError::NegativeCredit);
        }

        let apr = request.apr.unwrap_or(self.financing.default_apr_percent);
        if !apr.is_finite() || !(0.0..=self.financing.max_apr_percent).contains(&apr) {
            return Err(QuoteError::InvalidApr(self.financing.max_apr_percent));
        }

        let term = request.term_months.unwrap_or(self.financing.default_term_months);
        let term_offered = if self.financing.allowed_terms.is_empty() {
            term > 0 && term <= self.financing.max_term_months
        } else {
            self.financing.allowed_terms.contains(&term)
        };
        if !term_offered {
            return Err(QuoteError::InvalidTerm(term));
        }

        let financed = (request.price - request.down_payment - request.trade_in).max(0.0);
        let n = f64::from(term);
        let monthly_rate = apr / 100.0 / 12.0;
        let monthly = if financed == 0.0 {
            0.0
        } else if monthly_rate == 0.0 {
            financed / n
        } else {
            financed * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-n))
        };

        let monthly_payment = round_cents(monthly);
        let total_of_payments = round_cents(monthly_payment * n);
        Ok(Quote {
            monthly_payment,
            amount_financed: round_cents(financed),
            total_interest: round_cents((total_of_payments - financed).max(0.0)),
            total_cost: round_cents(total_of_payments + request.down_payment + request.trade_in),
            apr,
            term_months: term,
        })
    }

    /// `POST /api/payments/calculate`
    pub async fn calculate(&self, request: Request<Body>, response: ResponseSink) -> Result<(), HandlerError> {
        let input: QuoteRequest = match read_json(request).await? {
            Ok(input) => input,
            Err(err) => {
                response.error(StatusCode::BAD_REQUEST, &format!("Invalid request body: {err}"))?;
                return Ok(());
            }
        };

        match self.quote(&input) {
            Ok(quote) => response.json(StatusCode::OK, &quote)?,
            Err(err) => response.error(StatusCode::BAD_REQUEST, &err.to_string())?,
        }
        Ok(())
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
