mod quiz;
mod repository;
pub mod schema;

pub use quiz::Quiz;
pub use repository::{PgQuizRepository, QuizRepository, QuizStoreError};
