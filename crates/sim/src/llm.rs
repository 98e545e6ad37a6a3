//! Language-model plumbing shared by any LLM-backed decision oracle
//!
//! The HTTP client itself lives outside this crate; what is here is the
//! prompt rendering and the strict parsing of the model's reply.

use arena_core::{Decision, DecisionContext};
use arena_ports::{PortError, PortResult};
use std::fmt::Write;

/// Render the user message sent alongside the personality's system prompt
pub fn render_user_prompt(context: &DecisionContext) -> String {
    let mut prompt = String::from("Current trading context:\n");

    // Writing into a String cannot fail
    let _ = writeln!(prompt, "Balance: {} SOL", context.balance);
    let _ = writeln!(prompt, "Current costs: {} SOL", context.costs.total);
    let sentiment = context
        .market
        .as_ref()
        .map(|m| m.sentiment.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let _ = writeln!(prompt, "Market sentiment: {}", sentiment);
    let _ = writeln!(prompt, "Recent trades: {}", context.recent_trades.len());
    let _ = writeln!(
        prompt,
        "Success rate: {:.1}%",
        context.performance.success_rate * 100.0
    );
    let _ = writeln!(prompt, "Net profit: {} SOL", context.performance.net_profit);

    if let Some(market) = &context.market {
        prompt.push_str("\nMarket overview:\n");
        for token in &market.tokens {
            let sign = if token.change_24h.is_sign_positive() && !token.change_24h.is_zero() {
                "+"
            } else {
                ""
            };
            let _ = writeln!(
                prompt,
                "{}: ${} ({}{}%)",
                token.symbol, token.price, sign, token.change_24h
            );
        }
    }

    prompt.push_str(
        "\nBased on your personality and current situation, what trading action should you take?\n\
         Respond ONLY with valid JSON in this format:\n\
         {\n  \"action\": \"BUY\" | \"SELL\" | \"HOLD\",\n  \"tokenIn\": \"token symbol\",\n  \
         \"tokenOut\": \"token symbol\",\n  \"amount\": 0.1,\n  \"reasoning\": \"explanation of decision\"\n}",
    );
    prompt
}

/// Parse a model reply into a decision
///
/// Accepts bare JSON or JSON inside a ```json / ``` fence. Anything whose
/// `action` is not BUY, SELL or HOLD is an invalid response.
pub fn parse_decision(response: &str) -> PortResult<Decision> {
    let json = extract_json(response);

    let decision: Decision = serde_json::from_str(json)
        .map_err(|e| PortError::InvalidResponse(format!("decision JSON: {}", e)))?;

    if decision.amount.is_sign_negative() && !decision.amount.is_zero() {
        return Err(PortError::InvalidResponse(format!(
            "negative amount {}",
            decision.amount
        )));
    }
    Ok(decision)
}

fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    let fenced = if let Some((_, rest)) = trimmed.split_once("```json") {
        Some(rest)
    } else {
        trimmed.split_once("```").map(|(_, rest)| rest)
    };

    match fenced {
        Some(rest) => rest.split("```").next().unwrap_or(rest).trim(),
        None => trimmed,
    }
}
