use kernel::id::Id;

pub struct AccountMarker;

/// Store-assigned numeric account identity
pub type AccountId = Id<AccountMarker>;
