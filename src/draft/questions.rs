//! Structural edits on a draft's question list and on each question's answer
//! options. Every operation keeps option correctness attached to its option
//! record, so correct marks travel with their options through inserts,
//! deletions and reorders.

use super::{AnswerOption, Draft, Question, QuestionId};

/// Options a freshly added question starts with.
pub const DEFAULT_OPTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl Question {
    pub fn new_pending(option_count: usize) -> Self {
        Self {
            id: QuestionId::fresh(),
            title: String::new(),
            description: None,
            options: vec![AnswerOption::default(); option_count],
        }
    }

    /// Positions of the correct options, ascending. Derived view used by the
    /// save payload and by callers that think in indices.
    pub fn correct_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_correct)
            .map(|(i, _)| i)
            .collect()
    }
}

impl Draft {
    /// Appends a new question with a fresh pending id and
    /// [`DEFAULT_OPTION_COUNT`] empty options. Returns the id so the caller
    /// can bring the question into view.
    pub fn add_question(&mut self) -> QuestionId {
        self.add_question_with_options(DEFAULT_OPTION_COUNT)
    }

    pub fn add_question_with_options(&mut self, option_count: usize) -> QuestionId {
        let question = Question::new_pending(option_count);
        let id = question.id;
        self.questions.push(question);
        id
    }

    pub fn delete_question(&mut self, id: QuestionId) {
        self.questions.retain(|q| q.id != id);
    }

    /// Swaps the question at `index` with its neighbour. No-op at the
    /// boundaries.
    pub fn move_question(&mut self, index: usize, direction: MoveDirection) {
        match direction {
            MoveDirection::Up => {
                if index > 0 && index < self.questions.len() {
                    self.questions.swap(index, index - 1);
                }
            }
            MoveDirection::Down => {
                if index + 1 < self.questions.len() {
                    self.questions.swap(index, index + 1);
                }
            }
        }
    }

    /// Removes the question at `from` and re-inserts it at `to`, shifting the
    /// questions in between. No-op when the indices are equal or out of range.
    pub fn reorder_questions(&mut self, from: usize, to: usize) {
        if from == to || from >= self.questions.len() || to >= self.questions.len() {
            return;
        }
        let question = self.questions.remove(from);
        self.questions.insert(to, question);
    }

    /// Flips whether `option_index` of the question is a correct answer.
    /// Toggling twice restores the original state.
    pub fn toggle_correct(&mut self, id: QuestionId, option_index: usize) {
        if let Some(option) = self
            .question_mut(id)
            .and_then(|q| q.options.get_mut(option_index))
        {
            option.is_correct = !option.is_correct;
        }
    }

    /// Appends an empty, unpersisted, incorrect option.
    pub fn add_option(&mut self, id: QuestionId) {
        if let Some(question) = self.question_mut(id) {
            question.options.push(AnswerOption::default());
        }
    }

    /// Removes an option record. Correct marks on later options keep pointing
    /// at the same options, now one position earlier.
    pub fn delete_option(&mut self, id: QuestionId, index: usize) {
        if let Some(question) = self.question_mut(id) {
            if index < question.options.len() {
                question.options.remove(index);
            }
        }
    }

    /// Moves the option at `from` to `to`, shifting the records in between.
    pub fn reorder_options(&mut self, id: QuestionId, from: usize, to: usize) {
        if let Some(question) = self.question_mut(id) {
            if from == to || from >= question.options.len() || to >= question.options.len() {
                return;
            }
            let option = question.options.remove(from);
            question.options.insert(to, option);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_question(option_texts: &[&str], correct: &[usize]) -> (Draft, QuestionId) {
        let mut draft = Draft::empty("en");
        let id = draft.add_question_with_options(0);
        let question = draft.question_mut(id).unwrap();
        for (i, text) in option_texts.iter().enumerate() {
            question.options.push(AnswerOption {
                server_id: Some(i as i64 + 100),
                text: text.to_string(),
                is_correct: correct.contains(&i),
            });
        }
        (draft, id)
    }

    #[test]
    fn add_question_appends_with_default_options() {
        let mut draft = Draft::empty("en");
        let id = draft.add_question();
        assert_eq!(draft.questions.len(), 1);
        let question = draft.question(id).unwrap();
        assert_eq!(question.options.len(), DEFAULT_OPTION_COUNT);
        assert!(question.correct_indices().is_empty());
        assert!(question.id.server_id().is_none());

        let second = draft.add_question();
        assert_eq!(draft.questions[1].id, second);
        assert_ne!(id, second);
    }

    #[test]
    fn delete_option_shifts_later_correct_marks_down() {
        // 4 options, correct = {1, 3}; deleting index 1 removes that mark and
        // the index-3 mark becomes index 2.
        let (mut draft, id) = draft_with_question(&["A", "B", "C", "D"], &[1, 3]);
        draft.delete_option(id, 1);

        let question = draft.question(id).unwrap();
        assert_eq!(question.options.len(), 3);
        assert_eq!(question.correct_indices(), vec![2]);
        let texts: Vec<_> = question.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["A", "C", "D"]);
    }

    #[test]
    fn reorder_option_forward_moves_its_mark_with_it() {
        // Move index 0 to index 2 with correct = {0, 3}: the moved mark lands
        // on index 2, the trailing mark stays on index 3.
        let (mut draft, id) = draft_with_question(&["A", "B", "C", "D"], &[0, 3]);
        draft.reorder_options(id, 0, 2);

        let question = draft.question(id).unwrap();
        let texts: Vec<_> = question.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["B", "C", "A", "D"]);
        assert_eq!(question.correct_indices(), vec![2, 3]);
    }

    #[test]
    fn reorder_option_backward_shifts_intermediates_up() {
        let (mut draft, id) = draft_with_question(&["A", "B", "C", "D"], &[1, 3]);
        draft.reorder_options(id, 3, 1);

        let question = draft.question(id).unwrap();
        let texts: Vec<_> = question.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["A", "D", "B", "C"]);
        assert_eq!(question.correct_indices(), vec![1, 2]);
    }

    #[test]
    fn option_edits_keep_server_ids_aligned_with_texts() {
        let (mut draft, id) = draft_with_question(&["A", "B", "C"], &[]);
        draft.add_option(id);
        draft.reorder_options(id, 3, 0);
        draft.delete_option(id, 2);

        let question = draft.question(id).unwrap();
        for option in &question.options {
            match option.server_id {
                Some(sid) => {
                    let expected = ((sid - 100) as u8 + b'A') as char;
                    assert_eq!(option.text, expected.to_string());
                }
                None => assert!(option.text.is_empty()),
            }
        }
        assert!(question
            .correct_indices()
            .iter()
            .all(|&i| i < question.options.len()));
    }

    #[test]
    fn toggle_correct_is_an_involution() {
        let (mut draft, id) = draft_with_question(&["A", "B"], &[]);
        draft.toggle_correct(id, 1);
        assert_eq!(draft.question(id).unwrap().correct_indices(), vec![1]);
        draft.toggle_correct(id, 1);
        assert!(draft.question(id).unwrap().correct_indices().is_empty());
        // Out of range does nothing.
        draft.toggle_correct(id, 7);
        assert!(draft.question(id).unwrap().correct_indices().is_empty());
    }

    #[test]
    fn move_question_up_at_top_is_a_noop() {
        let mut draft = Draft::empty("en");
        let first = draft.add_question();
        let second = draft.add_question();

        draft.move_question(0, MoveDirection::Up);
        assert_eq!(draft.questions[0].id, first);

        draft.move_question(1, MoveDirection::Down);
        assert_eq!(draft.questions[1].id, second);

        draft.move_question(1, MoveDirection::Up);
        assert_eq!(draft.questions[0].id, second);
        assert_eq!(draft.questions[1].id, first);
    }

    #[test]
    fn reorder_questions_shifts_intervening_entries() {
        let mut draft = Draft::empty("en");
        let ids: Vec<_> = (0..4).map(|_| draft.add_question()).collect();
        draft.reorder_questions(3, 0);
        let order: Vec<_> = draft.questions.iter().map(|q| q.id).collect();
        assert_eq!(order, [ids[3], ids[0], ids[1], ids[2]]);

        draft.reorder_questions(2, 2);
        let unchanged: Vec<_> = draft.questions.iter().map(|q| q.id).collect();
        assert_eq!(unchanged, order);
    }

    #[test]
    fn delete_question_removes_only_that_question() {
        let mut draft = Draft::empty("en");
        let first = draft.add_question();
        let second = draft.add_question();
        draft.delete_question(first);
        assert_eq!(draft.questions.len(), 1);
        assert_eq!(draft.questions[0].id, second);
    }
}
