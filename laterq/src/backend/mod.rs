/// Redis-backed implementation of the [`Store`] trait.
///
/// [`Store`]: crate::store::Store
pub mod redis;

pub use self::redis::RedisStore;
