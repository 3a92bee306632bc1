//! Piggy bank vault contract bindings.
//!
//! The vault keeps an append-only list of deposits per account. Each deposit
//! holds either the native coin (token = `address(0)`) or an ERC20 token and
//! can be withdrawn once its unlock time has passed.

use alloy_sol_types::sol;

sol! {
    /// PiggyBank - Timelocked savings vault
    #[sol(rpc)]
    interface IPiggyBank {
        /// Number of deposits ever made by `user`
        function depositsLength(address user) external view returns (uint256);

        /// Get a single deposit of `user` by index
        function getDeposit(address user, uint256 index)
            external view returns (
                address token,
                uint256 amount,
                uint256 unlockTime,
                bool withdrawn
            );

        /// Lock native coin for `lockSeconds`
        function depositETH(uint256 lockSeconds) external payable;

        /// Lock `amount` of `token` for `lockSeconds` (requires allowance)
        function depositToken(address token, uint256 amount, uint256 lockSeconds) external;

        /// Withdraw a matured deposit
        function withdraw(uint256 index) external;

        /// Withdraw several matured deposits in one transaction
        function withdrawBatch(uint256[] calldata indices) external;
    }
}
