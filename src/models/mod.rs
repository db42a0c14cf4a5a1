pub mod question;

pub use question::{
    ExplanationStep, OptionInput, Question, QuestionInput, QuestionOption, QuestionResponse,
    StepInput,
};
