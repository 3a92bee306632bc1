//! ERC20 token bindings.
//!
//! Only the calls a token deposit needs: metadata for display and amount
//! parsing, and the approval the vault pulls from.

use alloy_sol_types::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        /// Let the vault pull `amount` from the caller
        function approve(address spender, uint256 amount) external returns (bool);

        function symbol() external view returns (string memory);

        function decimals() external view returns (uint8);
    }
}
