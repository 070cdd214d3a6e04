use serde::Deserialize;
use serde_json::from_str;

use include_dir::{include_dir, Dir};
use std::error::Error;
use std::fs;
use std::path::Path;

static BANK_DIR: Dir = include_dir!("src/bank");

/// One quiz question and the numeric answer accepted for it
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub answer: f64,
}

/// Ordered, read-only sequence of questions. A question is identified by its
/// position; the load order is the presentation order and is never reshuffled.
#[derive(Deserialize, Clone, Debug)]
pub struct QuestionBank {
    pub name: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            name: name.into(),
            questions,
        }
    }

    /// The bank embedded in the binary
    pub fn standard() -> Self {
        read_bank_from_asset("standard.json").expect("embedded bank is present and valid")
    }

    /// Load a replacement bank (same JSON shape) from disk
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        let bank: QuestionBank = from_str(&contents)?;
        Ok(bank)
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn read_bank_from_asset(file_name: &str) -> Result<QuestionBank, Box<dyn Error>> {
    let file = BANK_DIR.get_file(file_name).expect("Bank file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let bank = from_str(file_as_str).expect("Unable to deserialize bank json");

    Ok(bank)
}
