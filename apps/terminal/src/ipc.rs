//! # Command Bridge
//!
//! JSON lines in, JSON lines out. One request per line, one response per
//! request, in order.
//!
//! ```text
//! stdin   {"id":7,"cmd":"add_denomination","args":{"amount":"500"}}
//! stdout  {"id":7,"ok":true,"data":{"due":23750,"received":50000,...}}
//!
//! stdin   {"cmd":"hold"}
//! stdout  {"ok":false,"error":{"code":"EMPTY_CART","message":"Cart is empty"}}
//! ```
//!
//! A bad line or a failed command produces an error response; the loop
//! keeps reading until end of input.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::commands::{cart, held, payment, prep, sales};
use crate::error::{ApiError, ApiResult};
use crate::state::Session;

/// One command invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Echoed back so callers can match responses.
    #[serde(default)]
    pub id: Option<Value>,
    pub cmd: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    pub fn success(id: Option<Value>, data: Value) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

fn parse<T: DeserializeOwned>(cmd: &str, args: Value) -> ApiResult<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| ApiError::bad_request(format!("Invalid arguments for {}: {}", cmd, e)))
}

fn to_data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

async fn handle(session: &Session, cmd: &str, args: Value) -> ApiResult<Value> {
    match cmd {
        // Cart
        "get_cart" => to_data(cart::get_cart(session).await),
        "add_item" => to_data(cart::add_item(session, parse(cmd, args)?).await?),
        "change_quantity" => to_data(cart::change_quantity(session, parse(cmd, args)?).await?),
        "clear_cart" => to_data(cart::clear_cart(session).await?),
        "set_table" => to_data(cart::set_table(session, parse(cmd, args)?).await?),
        "set_order_type" => to_data(cart::set_order_type(session, parse(cmd, args)?).await?),

        // Held bills
        "hold" => to_data(held::hold(session).await?),
        "retrieve" => to_data(held::retrieve(session).await?),
        "list_held_bills" => to_data(held::list_held_bills(session).await),
        "discard_held_bill" => to_data(held::discard_held_bill(session, parse(cmd, args)?).await?),

        // Kitchen queue
        "confirm_order" => to_data(prep::confirm_order(session, parse(cmd, args)?).await?),
        "mark_served" => to_data(prep::mark_served(session, parse(cmd, args)?).await?),
        "remove_ticket" => to_data(prep::remove_ticket(session, parse(cmd, args)?).await?),
        "load_for_payment" => to_data(prep::load_for_payment(session, parse(cmd, args)?).await?),
        "list_tickets" => to_data(prep::list_tickets(session).await),

        // Payment
        "open_payment" => to_data(payment::open_payment(session).await?),
        "add_denomination" => {
            to_data(payment::add_denomination(session, parse(cmd, args)?).await?)
        }
        "mark_exact" => to_data(payment::mark_exact(session).await?),
        "undo_last" => to_data(payment::undo_last(session).await?),
        "reset_payment" => to_data(payment::reset_payment(session).await?),
        "set_manual_received" => {
            to_data(payment::set_manual_received(session, parse(cmd, args)?).await?)
        }
        "get_payment" => to_data(payment::get_payment(session).await),
        "cancel_payment" => to_data(payment::cancel_payment(session).await?),
        "finalize_payment" => to_data(payment::finalize_payment(session).await?),

        // Sales and snapshots
        "query_day" => to_data(sales::query_day(session, parse(cmd, args)?).await),
        "query_month" => to_data(sales::query_month(session, parse(cmd, args)?).await),
        "query_day_offset" => {
            to_data(sales::query_day_offset(session, parse(cmd, args)?).await?)
        }
        "list_receipts" => to_data(sales::list_receipts(session, parse(cmd, args)?).await),
        "get_receipt" => to_data(sales::get_receipt(session, parse(cmd, args)?).await?),
        "latest_receipt" => to_data(sales::latest_receipt(session).await),
        "get_state" => to_data(sales::get_state(session).await),
        "get_config" => to_data(sales::get_config(session)),

        other => Err(ApiError::bad_request(format!("Unknown command: {}", other))),
    }
}

/// Runs one request against the session.
pub async fn dispatch(session: &Session, request: Request) -> Response {
    let Request { id, cmd, args } = request;

    match handle(session, &cmd, args).await {
        Ok(data) => Response::success(id, data),
        Err(err) => {
            warn!(cmd = %cmd, code = ?err.code, "{}", err.message);
            Response::failure(id, err)
        }
    }
}

/// Parses one input line and runs it.
pub async fn dispatch_line(session: &Session, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(session, request).await,
        Err(e) => {
            warn!("Malformed request: {}", e);
            Response::failure(None, ApiError::bad_request(format!("Malformed request: {}", e)))
        }
    }
}

/// Serves requests from `reader` until end of input.
///
/// Input is read as raw bytes; a line that is not UTF-8 gets a
/// `BAD_REQUEST` response like any other malformed request.
pub async fn serve<R, W>(session: &Session, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut served = 0_u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                dispatch_line(session, line).await
            }
            Err(e) => {
                warn!("Request is not UTF-8: {}", e);
                Response::failure(None, ApiError::bad_request("Request is not valid UTF-8"))
            }
        };

        write_response(&mut writer, &response).await?;
        served += 1;
    }

    debug!(served, "Input closed");
    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut out = serde_json::to_string(response)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    out.push('\n');

    writer.write_all(out.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_null_args_as_empty() {
        let args: sales::QueryDayArgs = parse("query_day", Value::Null).unwrap();
        assert!(args.date.is_none());
    }

    #[test]
    fn test_parse_reports_command() {
        let err = parse::<crate::commands::IdArgs>("mark_served", serde_json::json!({}))
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::BadRequest);
        assert!(err.message.contains("mark_served"));
    }

    #[test]
    fn test_response_shape() {
        let ok = serde_json::to_value(Response::success(None, serde_json::json!(1))).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": true, "data": 1}));

        let err = serde_json::to_value(Response::failure(
            Some(serde_json::json!("a")),
            ApiError::bad_request("nope"),
        ))
        .unwrap();
        assert_eq!(err["id"], "a");
        assert_eq!(err["ok"], false);
        assert_eq!(err["error"]["code"], "BAD_REQUEST");
        assert!(err.get("data").is_none());
    }
}
