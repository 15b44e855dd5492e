//! contracts.rs - On-chain interfaces the venues talk to
//!
//! Human-readable ABI bindings. The router bindings double as the calldata
//! codecs: the generated call structs encode (and, in tests, decode) the
//! exact byte payloads the venues assemble.

use ethers::contract::abigen;

// Concentrated-liquidity quoter (read-only, consumed via eth_call).
abigen!(
    IQuoter,
    r#"[
        function quoteExactInput(bytes path, uint256 amountIn) external returns (uint256 amountOut, uint160[] sqrtPriceX96AfterList, uint32[] initializedTicksCrossedList, uint256 gasEstimate)
    ]"#
);

// Concentrated-liquidity swap router. exactInput takes the packed path and
// settles to the recipient inside the params tuple; unwrap/refund handle the
// native-asset sides and multicall batches everything atomically.
abigen!(
    ISwapRouter,
    r#"[
        {"type":"function","name":"exactInput","stateMutability":"payable",
         "inputs":[{"name":"params","type":"tuple","components":[
            {"name":"path","type":"bytes"},
            {"name":"recipient","type":"address"},
            {"name":"amountIn","type":"uint256"},
            {"name":"amountOutMinimum","type":"uint256"}]}],
         "outputs":[{"name":"amountOut","type":"uint256"}]},
        {"type":"function","name":"unwrapWETH9","stateMutability":"payable",
         "inputs":[{"name":"amountMinimum","type":"uint256"},{"name":"recipient","type":"address"}],
         "outputs":[]},
        {"type":"function","name":"refundETH","stateMutability":"payable",
         "inputs":[],"outputs":[]},
        {"type":"function","name":"multicall","stateMutability":"payable",
         "inputs":[{"name":"data","type":"bytes[]"}],
         "outputs":[{"name":"results","type":"bytes[]"}]}
    ]"#
);

// Stable/volatile pool router. getAmountOut returns the pool type alongside
// the quote; the hop list reuses it verbatim.
abigen!(
    IStableRouter,
    r#"[
        {"type":"function","name":"getAmountOut","stateMutability":"view",
         "inputs":[{"name":"amountIn","type":"uint256"},{"name":"tokenIn","type":"address"},{"name":"tokenOut","type":"address"}],
         "outputs":[{"name":"amount","type":"uint256"},{"name":"stable","type":"bool"}]},
        {"type":"function","name":"swapExactETHForTokens","stateMutability":"payable",
         "inputs":[
            {"name":"amountOutMin","type":"uint256"},
            {"name":"routes","type":"tuple[]","components":[
               {"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"stable","type":"bool"}]},
            {"name":"to","type":"address"},
            {"name":"deadline","type":"uint256"}],
         "outputs":[{"name":"amounts","type":"uint256[]"}]},
        {"type":"function","name":"swapExactTokensForETH","stateMutability":"nonpayable",
         "inputs":[
            {"name":"amountIn","type":"uint256"},
            {"name":"amountOutMin","type":"uint256"},
            {"name":"routes","type":"tuple[]","components":[
               {"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"stable","type":"bool"}]},
            {"name":"to","type":"address"},
            {"name":"deadline","type":"uint256"}],
         "outputs":[{"name":"amounts","type":"uint256[]"}]},
        {"type":"function","name":"swapExactTokensForTokens","stateMutability":"nonpayable",
         "inputs":[
            {"name":"amountIn","type":"uint256"},
            {"name":"amountOutMin","type":"uint256"},
            {"name":"routes","type":"tuple[]","components":[
               {"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"stable","type":"bool"}]},
            {"name":"to","type":"address"},
            {"name":"deadline","type":"uint256"}],
         "outputs":[{"name":"amounts","type":"uint256[]"}]}
    ]"#
);
