//! Single-choice quiz widgets.
//!
//! Each `.quiz-container` becomes an independent [`QuizWidget`] whose
//! lifecycle is the explicit [`QuizState`]: `Idle -> Selected -> Submitted`.
//! A submitted quiz never changes again.

use std::{cell::RefCell, rc::Rc};

use crate::{config::QuizConfig, dom::Dom};

/// Attribute flagging an option as a right answer (`"true"`).
pub const CORRECT_ATTRIBUTE: &str = "data-correct";
/// Feedback region attribute overriding the success message.
pub const CORRECT_FEEDBACK_ATTRIBUTE: &str = "data-correct-feedback";
/// Feedback region attribute overriding the failure message.
pub const INCORRECT_FEEDBACK_ATTRIBUTE: &str = "data-incorrect-feedback";

/// Lifecycle of one quiz instance. Options are identified by their index in
/// document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizState {
    /// Nothing selected.
    #[default]
    Idle,
    /// One option selected, not yet submitted.
    Selected(usize),
    /// Answer submitted; terminal.
    Submitted {
        /// The option that was submitted.
        choice: usize,
        /// Whether that option was a right answer.
        correct: bool,
    },
}

impl QuizState {
    /// State after clicking `option`: re-clicking the selection clears it,
    /// any other option replaces it, and a submitted quiz ignores clicks.
    pub fn select(self, option: usize) -> Self {
        match self {
            Self::Idle => Self::Selected(option),
            Self::Selected(current) if current == option => Self::Idle,
            Self::Selected(_) => Self::Selected(option),
            submitted @ Self::Submitted { .. } => submitted,
        }
    }

    /// State after submitting, given the correctness of the selection.
    /// Only a pending selection can be submitted.
    pub fn submit(self, correct: bool) -> Self {
        match self {
            Self::Selected(choice) => Self::Submitted {
                choice,
                correct,
            },
            other => other,
        }
    }

    /// The option currently selected, before submission.
    pub fn selection(self) -> Option<usize> {
        match self {
            Self::Selected(option) => Some(option),
            _ => None,
        }
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(self) -> bool {
        matches!(self, Self::Selected(_))
    }

    /// Whether the quiz reached its terminal state.
    pub fn is_submitted(self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

struct QuizOption<N> {
    node: N,
    correct: bool,
}

/// One mounted quiz: its elements plus its [`QuizState`].
pub struct QuizWidget<D: Dom> {
    dom: D,
    config: Rc<QuizConfig>,
    options: Vec<QuizOption<D::Node>>,
    submit: Option<D::Node>,
    feedback: Option<D::Node>,
    state: QuizState,
}

/// Shared handle used by a quiz's own event handlers.
pub type SharedQuiz<D> = Rc<RefCell<QuizWidget<D>>>;

/// Mount every quiz on the page.
pub fn mount_all<D: Dom>(dom: &D, config: &Rc<QuizConfig>) -> Vec<SharedQuiz<D>> {
    dom.query_selector_all(&config.quiz_selector)
        .iter()
        .filter_map(|root| QuizWidget::mount(dom, root, config))
        .collect()
}

impl<D: Dom> QuizWidget<D> {
    /// Build the widget for `root` and register its handlers. Quizzes
    /// without options are skipped; without a submit control the options
    /// still toggle but nothing can be submitted.
    pub fn mount(dom: &D, root: &D::Node, config: &Rc<QuizConfig>) -> Option<SharedQuiz<D>> {
        let options: Vec<_> = dom
            .query_within(root, &config.option_selector)
            .into_iter()
            .map(|node| QuizOption {
                correct: is_flagged_correct(dom.attribute(&node, CORRECT_ATTRIBUTE).as_deref()),
                node,
            })
            .collect();
        if options.is_empty() {
            tracing::debug!("quiz without options skipped");
            return None;
        }
        let submit = dom
            .query_within(root, &config.submit_selector)
            .into_iter()
            .next();
        if submit.is_none() {
            tracing::debug!("quiz without submit control, selection only");
        }
        let feedback = dom
            .query_within(root, &config.feedback_selector)
            .into_iter()
            .next();

        let widget = Rc::new(RefCell::new(Self {
            dom: dom.clone(),
            config: Rc::clone(config),
            options,
            submit: submit.clone(),
            feedback,
            state: QuizState::Idle,
        }));

        {
            let quiz = widget.borrow();
            quiz.sync_submit();
            for (index, option) in quiz.options.iter().enumerate() {
                let handle = Rc::clone(&widget);
                dom.listen(
                    &option.node,
                    "click",
                    Box::new(move |_: &D::Event| {
                        if let Ok(mut quiz) = handle.try_borrow_mut() {
                            quiz.click_option(index);
                        }
                    }),
                );
            }
        }

        if let Some(submit) = &submit {
            let handle = Rc::clone(&widget);
            dom.listen(
                submit,
                "click",
                Box::new(move |_: &D::Event| {
                    if let Ok(mut quiz) = handle.try_borrow_mut() {
                        quiz.submit();
                    }
                }),
            );
        }

        Some(widget)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// Handle a click on the option at `index`.
    pub fn click_option(&mut self, index: usize) -> QuizState {
        if self.state.is_submitted() || index >= self.options.len() {
            return self.state;
        }

        self.state = self.state.select(index);
        let selection = self.state.selection();
        for (i, option) in self.options.iter().enumerate() {
            let selected = selection == Some(i);
            if selected {
                self.dom.add_class(&option.node, &self.config.selected_class);
            } else {
                self.dom.remove_class(&option.node, &self.config.selected_class);
            }
            self.dom
                .set_attribute(&option.node, "aria-pressed", if selected { "true" } else { "false" });
        }
        self.sync_submit();
        self.state
    }

    /// Submit the pending selection. Returns whether it was correct, or
    /// `None` when there was nothing to submit.
    pub fn submit(&mut self) -> Option<bool> {
        let choice = self.state.selection()?;
        let correct = self.options.get(choice)?.correct;
        self.state = self.state.submit(correct);

        if let Some(feedback) = &self.feedback {
            self.render_feedback(feedback, correct);
        }

        for (i, option) in self.options.iter().enumerate() {
            if option.correct {
                self.dom.add_class(&option.node, &self.config.correct_class);
            } else if i == choice {
                self.dom.add_class(&option.node, &self.config.incorrect_class);
            }
            self.dom.add_class(&option.node, &self.config.disabled_class);
            self.dom.set_attribute(&option.node, "aria-disabled", "true");
            self.dom.set_style(&option.node, "pointer-events", "none");
        }
        self.sync_submit();

        tracing::debug!(choice, correct, "quiz submitted");
        Some(correct)
    }

    fn render_feedback(&self, feedback: &D::Node, correct: bool) {
        let config = &self.config;
        let (attribute, prefix, default_text, add, remove) = if correct {
            (
                CORRECT_FEEDBACK_ATTRIBUTE,
                &config.correct_prefix,
                &config.correct_feedback,
                &config.correct_class,
                &config.incorrect_class,
            )
        } else {
            (
                INCORRECT_FEEDBACK_ATTRIBUTE,
                &config.incorrect_prefix,
                &config.incorrect_feedback,
                &config.incorrect_class,
                &config.correct_class,
            )
        };
        // an override replaces only the text after the marker
        let detail = self
            .dom
            .attribute(feedback, attribute)
            .filter(|custom| !custom.is_empty())
            .unwrap_or_else(|| default_text.clone());

        self.dom.set_text_content(feedback, &format!("{prefix}{detail}"));
        self.dom.add_class(feedback, &config.show_class);
        self.dom.remove_class(feedback, remove);
        self.dom.add_class(feedback, add);
    }

    fn sync_submit(&self) {
        let Some(submit) = &self.submit else {
            return;
        };
        if self.state.can_submit() {
            self.dom.remove_attribute(submit, "disabled");
        } else {
            self.dom.set_attribute(submit, "disabled", "");
        }
    }
}

fn is_flagged_correct(value: Option<&str>) -> bool {
    value == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimDom, SimNode};

    struct Fixture {
        dom: SimDom,
        options: Vec<SimNode>,
        submit: SimNode,
        feedback: SimNode,
        quiz: SharedQuiz<SimDom>,
    }

    /// Quiz with three options; the second one is right.
    fn fixture(feedback_attrs: &[(&str, &str)]) -> Fixture {
        let dom = SimDom::new();
        let root = dom.append(dom.body(), "div", &[("class", "quiz-container")]);
        let options = ["false", "true", "false"]
            .iter()
            .map(|flag| dom.append(root, "button", &[("class", "quiz-option"), ("data-correct", *flag)]))
            .collect();
        let submit = dom.append(root, "button", &[("class", "quiz-submit")]);
        let mut attrs = vec![("class", "quiz-feedback")];
        attrs.extend_from_slice(feedback_attrs);
        let feedback = dom.append(root, "div", &attrs);

        let quiz = QuizWidget::mount(&dom, &root, &Rc::new(QuizConfig::default()))
            .expect("fixture quiz mounts");
        Fixture {
            dom,
            options,
            submit,
            feedback,
            quiz,
        }
    }

    fn selected(f: &Fixture) -> Vec<usize> {
        f.options
            .iter()
            .enumerate()
            .filter(|(_, node)| f.dom.has_class(node, "selected"))
            .map(|(i, _)| i)
            .collect()
    }

    fn submit_disabled(f: &Fixture) -> bool {
        f.dom.attribute(&f.submit, "disabled").is_some()
    }

    #[test]
    fn state_transitions() {
        let state = QuizState::Idle.select(0);
        assert_eq!(state, QuizState::Selected(0));
        assert_eq!(state.select(2), QuizState::Selected(2));
        assert_eq!(state.select(0), QuizState::Idle);
        assert_eq!(QuizState::Idle.submit(true), QuizState::Idle);

        let done = state.submit(false);
        assert_eq!(
            done,
            QuizState::Submitted {
                choice: 0,
                correct: false
            }
        );
        assert_eq!(done.select(1), done);
        assert_eq!(done.submit(true), done);
        assert!(!done.can_submit());
    }

    #[test]
    fn at_most_one_option_is_selected() {
        let f = fixture(&[]);
        assert!(submit_disabled(&f));

        f.dom.click(f.options[0]);
        assert_eq!(selected(&f), vec![0]);
        f.dom.click(f.options[2]);
        assert_eq!(selected(&f), vec![2]);
        assert_eq!(f.dom.attribute(&f.options[0], "aria-pressed").as_deref(), Some("false"));
        assert!(!submit_disabled(&f));
    }

    #[test]
    fn reclicking_selection_clears_it_and_disables_submit() {
        let f = fixture(&[]);
        f.dom.click(f.options[1]);
        assert!(!submit_disabled(&f));

        f.dom.click(f.options[1]);
        assert!(selected(&f).is_empty());
        assert!(submit_disabled(&f));
        assert_eq!(f.quiz.borrow().state(), QuizState::Idle);
    }

    #[test]
    fn correct_submission_shows_success_feedback() {
        let f = fixture(&[]);
        f.dom.click(f.options[1]);
        f.dom.click(f.submit);

        assert!(f.dom.has_class(&f.feedback, "correct"));
        assert!(f.dom.has_class(&f.feedback, "show"));
        assert_eq!(f.dom.text_content(&f.feedback), "✓ Correct! Well done!");
        assert!(f.dom.has_class(&f.options[1], "correct"));
        assert!(submit_disabled(&f));
        assert_eq!(
            f.quiz.borrow().state(),
            QuizState::Submitted {
                choice: 1,
                correct: true
            }
        );
    }

    #[test]
    fn wrong_submission_reveals_answer_and_marks_choice() {
        let f = fixture(&[]);
        f.dom.click(f.options[2]);
        f.dom.click(f.submit);

        assert!(f.dom.has_class(&f.feedback, "incorrect"));
        assert!(!f.dom.has_class(&f.feedback, "correct"));
        assert_eq!(f.dom.text_content(&f.feedback), "✗ Incorrect. Try again!");
        assert!(f.dom.has_class(&f.options[1], "correct"));
        assert!(f.dom.has_class(&f.options[2], "incorrect"));
        assert!(!f.dom.has_class(&f.options[0], "incorrect"));
        for option in &f.options {
            assert!(f.dom.has_class(option, "disabled"));
            assert_eq!(f.dom.attribute(option, "aria-disabled").as_deref(), Some("true"));
            assert_eq!(f.dom.style(*option, "pointer-events").as_deref(), Some("none"));
        }
    }

    #[test]
    fn custom_correct_feedback_keeps_success_marker() {
        let f = fixture(&[("data-correct-feedback", "Ownership moves.")]);
        f.dom.click(f.options[1]);
        f.dom.click(f.submit);

        let text = f.dom.text_content(&f.feedback);
        assert!(text.starts_with('✓'));
        assert_eq!(text, "✓ Correct! Ownership moves.");
    }

    #[test]
    fn custom_incorrect_feedback_keeps_failure_marker() {
        let f = fixture(&[
            ("data-correct-feedback", "Ownership moves."),
            ("data-incorrect-feedback", "It is moved, not copied."),
        ]);
        f.dom.click(f.options[0]);
        f.dom.click(f.submit);
        assert_eq!(f.dom.text_content(&f.feedback), "✗ Incorrect. It is moved, not copied.");
    }

    #[test]
    fn empty_override_falls_back_to_default_text() {
        let f = fixture(&[("data-correct-feedback", "")]);
        f.dom.click(f.options[1]);
        f.dom.click(f.submit);
        assert_eq!(f.dom.text_content(&f.feedback), "✓ Correct! Well done!");
    }

    #[test]
    fn submitted_quiz_ignores_further_clicks() {
        let f = fixture(&[]);
        f.dom.click(f.options[0]);
        f.dom.click(f.submit);
        let state = f.quiz.borrow().state();
        let feedback = f.dom.text_content(&f.feedback);

        f.dom.click(f.options[1]);
        f.dom.click(f.options[0]);
        f.dom.click(f.submit);

        assert_eq!(f.quiz.borrow().state(), state);
        assert_eq!(selected(&f), vec![0]);
        assert_eq!(f.dom.text_content(&f.feedback), feedback);
        assert!(!f.dom.has_class(&f.options[1], "selected"));
    }

    #[test]
    fn submit_without_selection_does_nothing() {
        let f = fixture(&[]);
        assert_eq!(f.quiz.borrow_mut().submit(), None);
        assert!(!f.dom.has_class(&f.feedback, "show"));
        assert_eq!(f.dom.text_content(&f.feedback), "");
    }

    #[test]
    fn quizzes_on_one_page_are_independent() {
        let dom = SimDom::new();
        let mut firsts = Vec::new();
        for _ in 0..2 {
            let root = dom.append(dom.body(), "div", &[("class", "quiz-container")]);
            firsts.push(dom.append(root, "div", &[("class", "quiz-option"), ("data-correct", "true")]));
            dom.append(root, "div", &[("class", "quiz-option")]);
            dom.append(root, "button", &[("class", "quiz-submit")]);
        }
        let quizzes = mount_all(&dom, &Rc::new(QuizConfig::default()));
        assert_eq!(quizzes.len(), 2);

        dom.click(firsts[0]);
        assert_eq!(quizzes[0].borrow().state(), QuizState::Selected(0));
        assert_eq!(quizzes[1].borrow().state(), QuizState::Idle);
    }

    #[test]
    fn quiz_without_options_is_skipped() {
        let dom = SimDom::new();
        let root = dom.append(dom.body(), "div", &[("class", "quiz-container")]);
        dom.append(root, "button", &[("class", "quiz-submit")]);
        assert!(mount_all(&dom, &Rc::new(QuizConfig::default())).is_empty());
    }

    #[test]
    fn options_still_toggle_without_submit_control() {
        let dom = SimDom::new();
        let root = dom.append(dom.body(), "div", &[("class", "quiz-container")]);
        let option = dom.append(root, "div", &[("class", "quiz-option"), ("data-correct", "true")]);
        let feedback = dom.append(root, "div", &[("class", "quiz-feedback")]);

        let quizzes = mount_all(&dom, &Rc::new(QuizConfig::default()));
        assert_eq!(quizzes.len(), 1);

        dom.click(option);
        assert!(dom.has_class(&option, "selected"));
        assert_eq!(quizzes[0].borrow().state(), QuizState::Selected(0));

        dom.click(option);
        assert!(!dom.has_class(&option, "selected"));
        assert!(!dom.has_class(&feedback, "show"));
    }

    #[test]
    fn only_exact_true_flags_an_option_correct() {
        assert!(is_flagged_correct(Some("true")));
        assert!(!is_flagged_correct(Some("TRUE")));
        assert!(!is_flagged_correct(Some(" true")));
        assert!(!is_flagged_correct(None));
    }
}
