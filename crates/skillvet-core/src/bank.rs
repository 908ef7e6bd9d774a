//! The question bank: a static but extensible catalog of interview
//! questions tagged by category and difficulty.
//!
//! Usage statistics sit behind a mutex so a bank shared across sessions
//! applies per-question updates single-writer-at-a-time.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::BankError;
use crate::model::{Category, Question};

/// Maximum |difficulty - target| for a direct match before relaxing to the
/// closest question.
pub const DIFFICULTY_WINDOW: f64 = 2.0;

/// Per-question usage counters, updated as sessions ask and score it.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionStats {
    pub usage_count: u32,
    pub avg_score: f64,
}

/// Catalog of questions with interior-mutable usage statistics.
#[derive(Debug, Default)]
pub struct QuestionBank {
    name: String,
    questions: Vec<Question>,
    stats: Mutex<HashMap<String, QuestionStats>>,
}

impl QuestionBank {
    /// Build a bank from a question list, rejecting duplicate ids.
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, BankError> {
        let mut bank = Self {
            name: name.into(),
            questions: Vec::with_capacity(questions.len()),
            stats: Mutex::new(HashMap::new()),
        };
        for question in questions {
            bank.add_question(question)?;
        }
        Ok(bank)
    }

    /// The built-in catalog covering all five categories.
    pub fn builtin() -> Self {
        Self {
            name: "builtin".into(),
            questions: builtin_questions(),
            stats: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_question(&mut self, question: Question) -> Result<(), BankError> {
        if self.questions.iter().any(|q| q.id == question.id) {
            return Err(BankError::DuplicateId(question.id));
        }
        self.questions.push(question);
        Ok(())
    }

    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Categories present in this bank, in rotation order.
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.questions.iter().any(|q| q.category == *c))
            .collect()
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .count()
    }

    /// Min and max difficulty, optionally restricted to a category.
    pub fn difficulty_range(&self, category: Option<Category>) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for q in &self.questions {
            if category.is_some_and(|c| q.category != c) {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(q.difficulty), hi.max(q.difficulty)),
                None => (q.difficulty, q.difficulty),
            });
        }
        range
    }

    /// Find a question near the target difficulty.
    ///
    /// Questions within [`DIFFICULTY_WINDOW`] of the target are preferred in
    /// catalog order; failing that, the closest remaining question wins,
    /// earliest first on ties. Excluded ids are never returned.
    pub fn find_match(
        &self,
        target_difficulty: f64,
        category: Option<Category>,
        exclude: &[String],
    ) -> Option<&Question> {
        let eligible = || {
            self.questions
                .iter()
                .filter(|q| !exclude.iter().any(|id| id == &q.id))
                .filter(|q| category.map_or(true, |c| q.category == c))
        };

        if let Some(q) =
            eligible().find(|q| (q.difficulty - target_difficulty).abs() <= DIFFICULTY_WINDOW)
        {
            return Some(q);
        }

        eligible().min_by(|a, b| {
            let da = (a.difficulty - target_difficulty).abs();
            let db = (b.difficulty - target_difficulty).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Count one presentation of a question.
    pub fn record_usage(&self, question_id: &str) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.entry(question_id.to_string()).or_default().usage_count += 1;
    }

    /// Fold an answer's overall score into the question's running average.
    pub fn record_score(&self, question_id: &str, score: f64) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        let entry = stats.entry(question_id.to_string()).or_default();
        if entry.usage_count > 1 {
            let n = entry.usage_count as f64;
            entry.avg_score = (entry.avg_score * (n - 1.0) + score) / n;
        } else {
            entry.avg_score = score;
        }
    }

    pub fn usage_stats(&self, question_id: &str) -> Option<QuestionStats> {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.get(question_id).copied()
    }
}

fn q(
    id: &str,
    text: &str,
    category: Category,
    difficulty: f64,
    model_answer: &str,
    criteria: &[&str],
) -> Question {
    Question {
        id: id.into(),
        text: text.into(),
        category,
        difficulty,
        model_answer: model_answer.into(),
        evaluation_criteria: criteria.iter().map(|c| c.to_string()).collect(),
        discrimination_index: 0.0,
        reliability_score: 0.0,
    }
}

fn builtin_questions() -> Vec<Question> {
    vec![
        // Basic formulas (difficulty 1-4)
        q(
            "basic_1",
            "How would you calculate the sum of values in cells A1 to A10? Please write the exact formula.",
            Category::BasicFormulas,
            2.0,
            "=SUM(A1:A10)",
            &["correct_function", "proper_range", "syntax"],
        ),
        q(
            "basic_2",
            "What's the difference between absolute and relative cell references? Give an example of each.",
            Category::BasicFormulas,
            3.0,
            "Relative: A1 changes when copied. Absolute: $A$1 stays fixed when copied.",
            &["understands_concept", "provides_examples", "syntax_knowledge"],
        ),
        q(
            "basic_3",
            "How would you calculate the average of numbers in column B, excluding blank cells?",
            Category::BasicFormulas,
            2.5,
            "=AVERAGE(B:B) skips blank cells automatically",
            &["correct_function", "handles_blanks", "range_specification"],
        ),
        q(
            "basic_4",
            "What function would you use to count non-empty cells in a range? Write an example.",
            Category::BasicFormulas,
            2.0,
            "=COUNTA(A1:A10) counts non-empty cells",
            &["correct_function", "understands_difference", "syntax"],
        ),
        // Data manipulation (difficulty 3-5)
        q(
            "manip_1",
            "What's the best way to remove duplicate entries from a large dataset?",
            Category::DataManipulation,
            4.5,
            "Data tab > Remove Duplicates, or Advanced Filter with unique records only",
            &["knows_tools", "data_cleaning", "best_practices"],
        ),
        q(
            "manip_2",
            "You receive a column of full names and need separate first and last name columns. How do you split them?",
            Category::DataManipulation,
            3.5,
            "Text to Columns with a space delimiter, or TEXTSPLIT; Flash Fill also works for simple patterns",
            &["knows_tools", "delimiter_handling", "alternatives"],
        ),
        q(
            "manip_3",
            "How would you sort a table by region, and within each region by descending sales?",
            Category::DataManipulation,
            4.0,
            "Data > Sort, add a level for Region then a level for Sales set to largest-to-smallest",
            &["sort_levels", "data_ordering", "tool_knowledge"],
        ),
        // Data analysis (difficulty 4-7)
        q(
            "analysis_1",
            "You have sales data in column A and dates in column B. How would you find the total sales for a specific month?",
            Category::DataAnalysis,
            5.0,
            "Use SUMIFS: =SUMIFS(A:A, B:B, \">=\"&DATE(year,month,1), B:B, \"<\"&DATE(year,month+1,1))",
            &["appropriate_function", "date_handling", "criteria_logic"],
        ),
        q(
            "analysis_2",
            "Explain the difference between VLOOKUP and INDEX/MATCH. When would you use each?",
            Category::DataAnalysis,
            6.0,
            "VLOOKUP searches right, limited. INDEX/MATCH more flexible, can search left, better performance.",
            &["understands_limitations", "performance_awareness", "use_cases"],
        ),
        q(
            "analysis_3",
            "How would you create a pivot table to analyze sales by region and product category?",
            Category::DataAnalysis,
            5.5,
            "Insert > Pivot Table, drag Region to Rows, Product Category to Columns, Sales to Values",
            &["pivot_knowledge", "field_placement", "analysis_thinking"],
        ),
        // Advanced functions (difficulty 6-9)
        q(
            "advanced_1",
            "How would you create a dynamic dropdown list that updates based on another cell's value?",
            Category::AdvancedFunctions,
            8.0,
            "Use INDIRECT with named ranges or OFFSET with data validation.",
            &["advanced_functions", "data_validation", "dynamic_references"],
        ),
        q(
            "advanced_2",
            "Write a formula to find the second highest value in a range A1:A100.",
            Category::AdvancedFunctions,
            7.0,
            "=LARGE(A1:A100,2) or use an array formula with LARGE",
            &["statistical_functions", "ranking_knowledge", "formula_construction"],
        ),
        q(
            "advanced_3",
            "How would you use array formulas to perform calculations across multiple ranges simultaneously?",
            Category::AdvancedFunctions,
            8.5,
            "Use Ctrl+Shift+Enter array formulas to calculate multiple conditions or ranges at once",
            &["array_understanding", "complex_calculations", "efficiency"],
        ),
        q(
            "advanced_4",
            "Explain how to use the CHOOSE function with a practical example.",
            Category::AdvancedFunctions,
            6.5,
            "CHOOSE(index_num, value1, value2, ...) returns the value at the index. =CHOOSE(2,\"Red\",\"Blue\",\"Green\") returns \"Blue\"",
            &["function_understanding", "practical_application", "syntax_knowledge"],
        ),
        // Automation (difficulty 7-10)
        q(
            "auto_1",
            "Describe how you would automate a monthly report generation process.",
            Category::Automation,
            9.0,
            "Use VBA macros, Power Query for data refresh, pivot tables, scheduled tasks.",
            &["automation_knowledge", "vba_understanding", "process_thinking"],
        ),
        q(
            "auto_2",
            "What's the difference between recording a macro and writing VBA code manually?",
            Category::Automation,
            7.5,
            "Recorded macros capture exact steps; manual VBA allows logic, loops, conditions, more flexibility",
            &["macro_understanding", "vba_knowledge", "flexibility_concepts"],
        ),
        q(
            "auto_3",
            "How would you create a user form to collect data input?",
            Category::Automation,
            8.5,
            "VBA Editor > Insert UserForm, add controls, write VBA code for events and data handling",
            &["userform_knowledge", "vba_skills", "ui_design"],
        ),
        q(
            "auto_4",
            "Explain how to use Power Query to import and transform data from multiple sources.",
            Category::Automation,
            8.0,
            "Data > Get Data, connect to sources, use the Power Query Editor for transformations, load to worksheet",
            &["power_query_knowledge", "data_transformation", "modern_features"],
        ),
    ]
}
