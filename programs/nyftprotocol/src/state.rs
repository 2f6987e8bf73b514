use anchor_lang::prelude::*;

use crate::error::ErrorCode;

/// Seed prefix for per-order escrow PDAs. Full seeds are
/// `[ESCROW_SEED, owner, order_id.to_le_bytes()]`.
pub const ESCROW_SEED: &[u8] = b"escrow";

/// One escrow per (owner, order_id) pair. Holds the deposited lamports and
/// the limit order placed against them.
#[account]
pub struct EscrowAccount {
    pub owner: Pubkey,
    pub balance: u64,
    pub order_id: u64,
    pub limit_order: LimitOrder,
}

impl EscrowAccount {
    pub const SIZE: usize = 32 + 8 + 8 + LimitOrder::SIZE;

    /// Resets the escrow for a fresh order. Balance starts at zero and the
    /// order slot is inactive until `place_order`.
    pub fn open(&mut self, owner: Pubkey, order_id: u64) {
        self.owner = owner;
        self.balance = 0;
        self.order_id = order_id;
        self.limit_order = LimitOrder::default();
    }

    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(error!(ErrorCode::AmountOverflow))?;
        Ok(())
    }

    /// Activates a limit order. Buy orders must already be funded up to the
    /// limit price.
    pub fn place_order(
        &mut self,
        order_type: OrderType,
        token_mint: Pubkey,
        limit_price: u64,
    ) -> Result<()> {
        if order_type == OrderType::Buy {
            require!(self.balance >= limit_price, ErrorCode::InsufficientFunds);
        }
        self.limit_order = LimitOrder {
            is_active: true,
            order_type,
            token_mint,
            limit_price,
        };
        Ok(())
    }

    pub fn cancel_order(&mut self) {
        self.limit_order.is_active = false;
    }

    /// An order may only execute while it is active.
    pub fn ensure_executable(&self) -> Result<()> {
        require!(self.limit_order.is_active, ErrorCode::OrderNotActive);
        Ok(())
    }

    pub fn is_owned_by(&self, user: &Pubkey) -> bool {
        self.owner == *user
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct LimitOrder {
    pub is_active: bool,
    pub order_type: OrderType,
    pub token_mint: Pubkey,
    pub limit_price: u64,
}

impl LimitOrder {
    pub const SIZE: usize = 1 + 1 + 32 + 8;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderType {
    #[default]
    Buy,
    Sell,
}

/// Scales a whole-token amount into base units for the given mint decimals.
pub fn to_base_units(amount: u64, decimals: u8) -> Result<u64> {
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(error!(ErrorCode::AmountOverflow))?;
    amount
        .checked_mul(scale)
        .ok_or(error!(ErrorCode::AmountOverflow))
}
