//! Classrooms: the university/faculty groupings resources are filed under.

mod repository;
mod service;
mod types;

pub use repository::ClassroomRepository;
pub use service::ClassroomService;
pub use types::{Classroom, ClassroomUpdate, NewClassroom};
