use alloy_sol_types::sol;

// Pinned call surface of the three deployed contracts. Addresses come from
// configuration; the method set below is the one every supported deployment
// must expose.
sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct CreatorData {
        uint256 id;
        address wallet;
        string metadata_uri;
        uint256 total_subscribers;
        uint256 total_earnings;
        bool is_verified;
        uint256 created_at;
        uint256 updated_at;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct TierData {
        uint256 id;
        uint256 creator_id;
        string name;
        string metadata_uri;
        uint256 price;
        uint256 created_at;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct SubscriptionData {
        uint256 id;
        address subscriber;
        uint256 creator_id;
        uint256 tier_id;
        uint256 amount;
        uint256 start_time;
        uint256 end_time;
        uint8 status; // 0: Active, 1: Expired, 2: Cancelled
        uint8 payment_type; // 0: Native, 1: ERC20
        address token_address;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct ContentData {
        uint256 id; // token id
        uint256 creator_id;
        uint256 tier_id;
        string content_uri;
        uint256 created_at;
    }

    interface ICreatorRegistry {
        function registerCreator(string metadata_uri) external;
        function updateCreator(string metadata_uri) external;
        function getCreator(uint256 creator_id) external view returns (CreatorData memory creator);
        function getCreatorIdByWallet(address wallet) external view returns (uint256 creator_id);
        function isVerifiedCreator(address wallet) external view returns (bool verified);
        function getTotalCreators() external view returns (uint256 total);
    }

    interface IContentNFT {
        function createTier(string name, string metadata_uri, uint256 price) external returns (uint256 tier_id);
        function getTier(uint256 creator_id, uint256 tier_id) external view returns (TierData memory tier);
        function getTierCount(uint256 creator_id) external view returns (uint256 count);
        function hasAccess(address account, uint256 tier_id) external view returns (bool granted);
        function uri(uint256 id) external view returns (string token_uri);
        function mintContent(uint256 tier_id, string content_uri) external returns (uint256 token_id);
        function getContentCount(uint256 creator_id) external view returns (uint256 count);
        function getContent(uint256 creator_id, uint256 index) external view returns (ContentData memory content);
        function getTokenTier(uint256 token_id) external view returns (uint256 tier_id);
        function getContentURI(uint256 token_id) external view returns (string content_uri);
        function getTierSubscriberCount(uint256 creator_id, uint256 tier_id) external view returns (uint256 count);
    }

    interface ISubscriptionManager {
        function subscribe(uint256 creator_id, uint256 tier_id, uint256 months) external payable returns (uint256 subscription_id);
        function renewSubscription(uint256 subscription_id, uint256 months) external payable;
        function cancelSubscription(uint256 subscription_id) external;
        function isSubscriptionActive(uint256 subscription_id) external view returns (bool active);
        function getSubscription(uint256 subscription_id) external view returns (SubscriptionData memory subscription);
        function getSubscriptionsBySubscriber(address subscriber) external view returns (uint256[] ids);
        function getSubscriberSubscriptions(address subscriber, uint256 creator_id) external view returns (uint256[] ids);
        function getSubscriptionsByCreator(uint256 creator_id) external view returns (uint256[] ids);
    }
}
