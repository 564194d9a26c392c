mod session;

pub use session::SessionRepo;
