use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{self, Mint, Token, TokenAccount, Transfer},
};
use ephemeral_rollups_sdk::anchor::{delegate, ephemeral};
use ephemeral_rollups_sdk::cpi::DelegateConfig;

pub mod error;
pub mod state;


use error::ErrorCode;
use state::{to_base_units, EscrowAccount, OrderType, ESCROW_SEED};

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[ephemeral]
#[program]
pub mod nyftprotocol {
    use super::*;

    /// Creates the escrow PDA for one order.
    pub fn initialize_escrow(ctx: Context<InitializeEscrow>, order_id: u64) -> Result<()> {
        let escrow = &mut ctx.accounts.escrow_account;
        escrow.open(ctx.accounts.user.key(), order_id);
        msg!(
            "Initialized escrow for user {} with order_id {}",
            escrow.owner,
            order_id
        );
        Ok(())
    }

    /// Hands the escrow PDA to the ephemeral rollup validator so order
    /// updates can run off the base layer.
    pub fn delegate_order(ctx: Context<DelegateOrder>, order_id: u64) -> Result<()> {
        ctx.accounts.delegate_escrow_account(
            &ctx.accounts.user,
            &[
                ESCROW_SEED,
                ctx.accounts.user.key().as_ref(),
                &order_id.to_le_bytes(),
            ],
            DelegateConfig::default(),
        )?;
        msg!(
            "Delegated escrow PDA for order_id {} to ephemeral validator",
            order_id
        );
        Ok(())
    }

    /// Funds a buy order with lamports held by the escrow PDA.
    pub fn deposit_sol(ctx: Context<DepositSol>, amount: u64) -> Result<()> {
        let cpi_context = CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.user.to_account_info(),
                to: ctx.accounts.escrow_account.to_account_info(),
            },
        );
        system_program::transfer(cpi_context, amount)?;

        ctx.accounts.escrow_account.credit(amount)?;
        msg!(
            "Deposited {} lamports for BUY order {}",
            amount,
            ctx.accounts.escrow_account.order_id
        );
        Ok(())
    }

    /// Funds a sell order by moving tokens into the escrow's associated
    /// token account. `amount` is in whole tokens.
    pub fn deposit_tokens(ctx: Context<DepositTokens>, amount: u64) -> Result<()> {
        let base_units = to_base_units(amount, ctx.accounts.token_mint.decimals)?;
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_token_account.to_account_info(),
                    to: ctx.accounts.escrow_token_account.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            base_units,
        )?;
        msg!(
            "Deposited {} tokens of mint {} for SELL order {}",
            amount,
            ctx.accounts.token_mint.key(),
            ctx.accounts.escrow_account.order_id
        );
        Ok(())
    }

    pub fn create_limit_order(
        ctx: Context<UpdateEscrow>,
        order_type: OrderType,
        token_mint: Pubkey,
        limit_price: u64,
    ) -> Result<()> {
        let escrow = &mut ctx.accounts.escrow_account;
        escrow.place_order(order_type, token_mint, limit_price)?;
        msg!(
            "Created {:?} order for token {} at price {} (order_id: {})",
            order_type,
            token_mint,
            limit_price,
            escrow.order_id
        );
        Ok(())
    }

    pub fn cancel_limit_order(ctx: Context<UpdateEscrow>) -> Result<()> {
        let escrow = &mut ctx.accounts.escrow_account;
        escrow.cancel_order();
        msg!("Cancelled order_id {}", escrow.order_id);
        Ok(())
    }

    /// Triggered by the crank once the order's price condition is met.
    pub fn execute_limit_order(ctx: Context<ExecuteOrder>) -> Result<()> {
        let escrow = &ctx.accounts.escrow_account;
        escrow.ensure_executable()?;
        msg!(
            "Executed order_id {} for owner {}",
            escrow.order_id,
            escrow.owner
        );
        Ok(())
    }
}

#[derive(Accounts)]
#[instruction(order_id: u64)]
pub struct InitializeEscrow<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        init,
        payer = user,
        space = 8 + EscrowAccount::SIZE,
        seeds = [ESCROW_SEED, user.key().as_ref(), &order_id.to_le_bytes()],
        bump
    )]
    pub escrow_account: Account<'info, EscrowAccount>,

    pub system_program: Program<'info, System>,
}

#[delegate]
#[derive(Accounts)]
pub struct DelegateOrder<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    /// CHECK: escrow PDA handed to the delegation program, validated by seeds
    /// at the CPI boundary
    #[account(mut, del)]
    pub escrow_account: AccountInfo<'info>,
}

#[derive(Accounts)]
pub struct DepositSol<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(mut)]
    pub escrow_account: Account<'info, EscrowAccount>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct DepositTokens<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    pub token_mint: Account<'info, Mint>,

    #[account(mut)]
    pub escrow_account: Account<'info, EscrowAccount>,

    #[account(
        mut,
        associated_token::mint = token_mint,
        associated_token::authority = user
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = user,
        associated_token::mint = token_mint,
        associated_token::authority = escrow_account
    )]
    pub escrow_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct UpdateEscrow<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = escrow_account.is_owned_by(&user.key()) @ ErrorCode::Unauthorized
    )]
    pub escrow_account: Account<'info, EscrowAccount>,
}

#[derive(Accounts)]
pub struct ExecuteOrder<'info> {
    pub crank: Signer<'info>,

    #[account(mut)]
    pub escrow_account: Account<'info, EscrowAccount>,

    /// CHECK: carried for instruction-interface compatibility, never read or
    /// written by the handler
    pub owner: AccountInfo<'info>,
}
