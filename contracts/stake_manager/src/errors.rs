/// Error categories used to classify [`ContractError`] codes off-chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// Caller lacks the right to mutate the targeted record.
    Authorization,
    /// Targeted stake is not in a state compatible with the request.
    State,
    /// A batch precondition about time or ledger state no longer holds.
    Consistency,
    /// Bad arguments or missing balance.
    Validation,
}

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    StakeNotOwned = 3,
    OnlyOwner = 4,
    NotAllowed = 5,
    StakeNotCustodied = 6,
    StakeNotEndable = 7,
    InvalidStakeReceiver = 8,
    Deadline = 9,
    BlockHash = 10,
    InvalidInput = 11,
    InsufficientBalance = 12,
    UnknownCurrency = 13,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::StakeNotOwned | ContractError::OnlyOwner | ContractError::NotAllowed => {
                ErrorCategory::Authorization
            }
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::StakeNotCustodied
            | ContractError::StakeNotEndable
            | ContractError::InvalidStakeReceiver => ErrorCategory::State,
            ContractError::Deadline | ContractError::BlockHash => ErrorCategory::Consistency,
            ContractError::InvalidInput
            | ContractError::InsufficientBalance
            | ContractError::UnknownCurrency => ErrorCategory::Validation,
        }
    }
}
