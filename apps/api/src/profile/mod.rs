// Skill profile: the durable, insertion-ordered list of the user's skills.

pub mod handlers;
pub mod store;

pub use store::SkillProfileStore;
