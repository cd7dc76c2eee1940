use serde::{Deserialize, Serialize};

/// Defines the stages a task moves through
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn next(&self) -> Option<Self>;
    fn label(&self) -> &'static str;

    fn is_practice(&self) -> bool {
        false
    }
    fn is_test(&self) -> bool {
        false
    }
    fn is_done(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Practice,
    Test,
    Done,
}

impl Phase for Stage {
    fn next(&self) -> Option<Self> {
        use Stage::*;
        Some(match self {
            Practice => Test,
            Test => Done,
            Done => return None,
        })
    }

    fn label(&self) -> &'static str {
        match self {
            Stage::Practice => "practice",
            Stage::Test => "test",
            Stage::Done => "done",
        }
    }

    fn is_practice(&self) -> bool {
        matches!(self, Stage::Practice)
    }

    fn is_test(&self) -> bool {
        matches!(self, Stage::Test)
    }

    fn is_done(&self) -> bool {
        matches!(self, Stage::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_run_practice_test_done() {
        let mut stage = Stage::default();
        assert!(stage.is_practice());
        stage = stage.next().unwrap();
        assert!(stage.is_test());
        stage = stage.next().unwrap();
        assert!(stage.is_done());
        assert_eq!(stage.next(), None);
    }
}
