use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Insufficient funds to perform this action.")]
    InsufficientFunds,
    #[msg("The order is not active and cannot be executed.")]
    OrderNotActive,
    #[msg("You are not authorized to perform this action.")]
    Unauthorized,
    #[msg("Amount arithmetic overflowed.")]
    AmountOverflow,
}
