#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
    /// Re-tick later. Documented leaves never return this; they wait in place instead.
    Running,
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    pub fn is_failure(self) -> bool {
        self == Status::Failure
    }

    /// Swap Success and Failure; Running is left untouched.
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}
