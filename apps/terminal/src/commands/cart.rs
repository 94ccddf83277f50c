//! # Cart Commands
//!
//! Building the open order.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Kitchen  │────►│  Paid    │       │
//! │  │  Cart    │     │          │     │  Queue   │     │ Receipt  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                     │      ▲       confirm_order    finalize_payment   │
//! │                add_item    │        (prep.rs)        (payment.rs)      │
//! │          change_quantity   │                                            │
//! │                     │      │                                            │
//! │                     ▼      │                                            │
//! │                   hold ── retrieve  (held.rs)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use somtam_core::{AddItemOptions, Cart, Money, OrderType, StateKey};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::Session;

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart: Cart,
    pub subtotal: Money,
    pub item_count: usize,
    pub total_quantity: u64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            cart: cart.clone(),
            subtotal: cart.subtotal(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemArgs {
    pub menu_item_id: String,
    #[serde(flatten)]
    pub options: AddItemOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeQuantityArgs {
    pub index: usize,
    pub delta: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTableArgs {
    #[serde(default)]
    pub table: String,
}

/// Either `"dine-in"` / `"takeaway"` or any free-text label.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOrderTypeArgs {
    pub order_type: String,
}

/// Gets the current cart contents.
pub async fn get_cart(session: &Session) -> CartResponse {
    debug!("get_cart command");
    session.read(|s| CartResponse::from(s.till.cart())).await
}

/// Adds a menu item to the cart.
///
/// ## Behavior
/// - Same item with the same spice, modifiers and note: quantity increases
/// - Otherwise: a new line at the top of the cart
/// - Name and price are frozen at the time of adding
pub async fn add_item(session: &Session, args: AddItemArgs) -> ApiResult<CartResponse> {
    debug!(menu_item_id = %args.menu_item_id, quantity = args.options.quantity, "add_item command");

    let catalog = session.catalog();
    let AddItemArgs {
        menu_item_id,
        options,
    } = args;
    let options = options.with_fallback_spice(session.config().fallback_spice_level.clone());

    let response = session
        .transact("add_item", &[StateKey::CartState], |s| {
            s.till.add_item(catalog, &menu_item_id, options)?;
            Ok(CartResponse::from(s.till.cart()))
        })
        .await?;

    info!(
        menu_item_id = %menu_item_id,
        subtotal = response.subtotal.cents(),
        "Item added to cart"
    );
    Ok(response)
}

/// Adds `delta` to the line at `index`; a line that reaches zero is removed.
pub async fn change_quantity(
    session: &Session,
    args: ChangeQuantityArgs,
) -> ApiResult<CartResponse> {
    debug!(index = args.index, delta = args.delta, "change_quantity command");

    session
        .transact("change_quantity", &[StateKey::CartState], |s| {
            s.till.cart_mut().change_quantity(args.index, args.delta)?;
            Ok(CartResponse::from(s.till.cart()))
        })
        .await
}

/// Removes every line. Table and order type stay.
pub async fn clear_cart(session: &Session) -> ApiResult<CartResponse> {
    debug!("clear_cart command");

    let response = session
        .transact("clear_cart", &[StateKey::CartState], |s| {
            s.till.cart_mut().clear();
            Ok(CartResponse::from(s.till.cart()))
        })
        .await?;

    info!("Cart cleared");
    Ok(response)
}

pub async fn set_table(session: &Session, args: SetTableArgs) -> ApiResult<CartResponse> {
    debug!(table = %args.table, "set_table command");

    session
        .transact("set_table", &[StateKey::CartState], |s| {
            s.till.cart_mut().set_table(&args.table)?;
            Ok(CartResponse::from(s.till.cart()))
        })
        .await
}

pub async fn set_order_type(
    session: &Session,
    args: SetOrderTypeArgs,
) -> ApiResult<CartResponse> {
    let order_type = OrderType::from_label(&args.order_type);
    debug!(label = %args.order_type, ?order_type, "set_order_type command");

    session
        .transact("set_order_type", &[StateKey::CartState], |s| {
            s.till.cart_mut().set_order_type(order_type);
            Ok(CartResponse::from(s.till.cart()))
        })
        .await
}
