//! ABI bindings for the lending-protocol and rewards contracts the harness touches.
//!
//! Only the entry points the bootstrap and the suites use are declared.

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct TokenData {
        string symbol;
        address tokenAddress;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct RewardsConfigInput {
        uint88 emissionPerSecond;
        uint256 totalSupply;
        uint32 distributionEnd;
        address asset;
        address reward;
        address transferStrategy;
        address rewardOracle;
    }

    #[derive(Debug)]
    interface IPoolDataProvider {
        function getAllHTokens() external view returns (TokenData[] memory);
        function getAllReservesTokens() external view returns (TokenData[] memory);
        function getReserveTokensAddresses(address asset)
            external
            view
            returns (
                address hTokenAddress,
                address stableDebtTokenAddress,
                address variableDebtTokenAddress
            );
    }

    #[derive(Debug)]
    interface IPool {
        function ADDRESSES_PROVIDER() external view returns (address);
        function getReservesList() external view returns (address[] memory);
        function getReserveNormalizedIncome(address asset) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IPoolConfigurator {
        function setPoolPause(bool paused) external;
        function setReserveActive(address asset, bool active) external;
    }

    #[derive(Debug)]
    interface IPoolAddressesProvider {
        function getPool() external view returns (address);
        function getPoolConfigurator() external view returns (address);
        function getPriceOracle() external view returns (address);
    }

    #[derive(Debug)]
    interface IPoolAddressesProviderRegistry {
        function getAddressesProvidersList() external view returns (address[] memory);
    }

    #[derive(Debug)]
    interface IHopeOracle {
        function getAssetPrice(address asset) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IWrappedTokenGateway {
        function depositETH(address pool, address onBehalfOf, uint16 referralCode) external payable;
    }

    #[derive(Debug)]
    interface IMintableERC20 {
        function addMinter(address account) external;
        function mint(address account, uint256 value) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
    }

    #[derive(Debug)]
    interface IWETH9Mocked {
        function addMinter(address account) external;
        function deposit() external payable;
        function balanceOf(address account) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IHToken {
        function UNDERLYING_ASSET_ADDRESS() external view returns (address);
        function balanceOf(address user) external view returns (uint256);
        function scaledBalanceOf(address user) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IStableDebtToken {
        function UNDERLYING_ASSET_ADDRESS() external view returns (address);
        function principalBalanceOf(address user) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IVariableDebtToken {
        function UNDERLYING_ASSET_ADDRESS() external view returns (address);
        function scaledBalanceOf(address user) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IEmissionManager {
        event EmissionAdminUpdated(
            address indexed reward,
            address indexed oldAdmin,
            address indexed newAdmin
        );

        function owner() external view returns (address);
        function setRewardsController(address controller) external;
        function getRewardsController() external view returns (address);
        function setEmissionAdmin(address reward, address admin) external;
        function getEmissionAdmin(address reward) external view returns (address);
        function setClaimer(address user, address claimer) external;
        function setTransferStrategy(address reward, address transferStrategy) external;
        function setRewardOracle(address reward, address rewardOracle) external;
        function setDistributionEnd(address asset, address reward, uint32 newDistributionEnd)
            external;
    }

    #[derive(Debug)]
    interface IRewardsController {
        function initialize(address emissionManager) external;
        function EMISSION_MANAGER() external view returns (address);
        function getEmissionManager() external view returns (address);
        function configureAssets(RewardsConfigInput[] config) external;
        function claimAllRewardsToSelf(address[] assets)
            external
            returns (address[] memory rewardsList, uint256[] memory claimedAmounts);
        function setDistributionEnd(address asset, address reward, uint32 newDistributionEnd)
            external;
        function getDistributionEnd(address asset, address reward) external view returns (uint256);
    }

    #[derive(Debug)]
    interface IHTokenMock {
        function setUserBalanceAndSupply(uint256 userBalance, uint256 totalSupply) external;
    }

    #[derive(Debug)]
    interface IMockAggregator {
        function latestAnswer() external view returns (int256);
    }

    #[derive(Debug)]
    interface ITransferStrategy {
        function getIncentivesController() external view returns (address);
        function getRewardsAdmin() external view returns (address);
    }
}
