mod session;

pub use session::InMemorySessionRepo;
