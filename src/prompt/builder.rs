use crate::idea::Selection;
use crate::persona::Persona;
use crate::retrieval::ExampleRecord;

/// Knobs that change the prompt text between profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptOptions {
    pub persona: Persona,
    /// Ask for an `Execution Plan:` section in the reply
    pub execution_plan: bool,
}

/// Builds the complete generation prompt: persona, request, examples, output schema.
///
/// Pure: identical inputs always render byte-identical text.
pub fn build_prompt(
    examples: &[ExampleRecord],
    selection: &Selection,
    options: &PromptOptions,
) -> String {
    let mut prompt = String::new();

    // 1. Persona preamble
    prompt.push_str(options.persona.prompt());
    prompt.push_str("\n\n");

    // 2. What the user picked
    prompt.push_str(&describe_selection(selection));
    prompt.push_str("\n\n");

    // 3. Reference examples, in retrieval order
    if examples.is_empty() {
        prompt.push_str("No reference examples are available this time, so lean on your own back catalogue.\n\n");
    } else {
        prompt.push_str("Here are some examples:\n\n");
        for example in examples {
            prompt.push_str(&format_example(example));
        }
    }

    // 4. Closing instruction + output schema the parser depends on
    prompt.push_str("---\n\n");
    prompt.push_str("Now, generate a brand-new idea in the same style. ");
    prompt.push_str("Be creative, surprising, and mischievous, but realistic and legally possible.\n\n");
    prompt.push_str("Return in this format:\nTitle:\nDescription:");
    if options.execution_plan {
        prompt.push_str("\nExecution Plan:");
    }

    prompt
}

/// The user's parameters in natural language
pub fn describe_selection(selection: &Selection) -> String {
    match selection.companionship {
        Some(companionship) => format!(
            "The user wants a {} video and to do it {}.",
            selection.category,
            companionship.phrase()
        ),
        None => format!("The user wants a {} video.", selection.category),
    }
}

/// One labelled example block
pub fn format_example(example: &ExampleRecord) -> String {
    format!(
        "---\nTitle: {}\nDescription: {}\nPayoff: {}\nStyle: {}\nSummary: {}\n\n",
        example.title, example.description, example.payoff, example.style, example.summary
    )
}
