use soroban_sdk::{contractclient, symbol_short, Address, Bytes, Env, Symbol};

/// Acknowledgement a receiver must return from `on_stake_received`.
pub const STAKE_RECEIVED: Symbol = symbol_short!("STK_RCVD");

/// Hook invoked on the destination of a `safe_transfer_stake`.
///
/// Any error raised by the receiver aborts the transfer and reaches the
/// original caller untouched.
#[contractclient(name = "StakeReceiverClient")]
pub trait StakeReceiver {
    fn on_stake_received(
        env: Env,
        operator: Address,
        from: Address,
        stake_id: u64,
        data: Bytes,
    ) -> Symbol;
}
