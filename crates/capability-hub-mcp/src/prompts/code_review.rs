//! Prompt templates for reviewing, debugging and optimizing code.

use capability_hub::{CapabilityDescriptor, CapabilityResult, ParamSpec, ParamType, Payload};

/// Expand the `code_review` prompt.
pub fn code_review(code: &str, language: &str) -> String {
    format!(
        "Please conduct a thorough code review of the following {language} code:

```{language}
{code}
```

Please analyze the code for:

1. **Code Quality**:
   - Readability and clarity
   - Naming conventions
   - Code structure and organization

2. **Best Practices**:
   - Language-specific conventions
   - Design patterns usage
   - SOLID principles adherence

3. **Performance**:
   - Time complexity analysis
   - Memory usage considerations
   - Potential bottlenecks

4. **Security**:
   - Input validation
   - Potential vulnerabilities
   - Security best practices

5. **Maintainability**:
   - Code documentation
   - Error handling
   - Testability

6. **Bugs and Issues**:
   - Logic errors
   - Edge cases
   - Potential runtime issues

Please provide specific suggestions for improvement with examples where applicable."
    )
}

/// Expand the `bug_analysis` prompt. The code block is omitted when no
/// context is given.
pub fn bug_analysis(error_message: &str, code_context: &str) -> String {
    let mut prompt = format!(
        "Please help analyze and debug the following issue:

**Error/Issue Description:**
{error_message}
"
    );

    if !code_context.is_empty() {
        prompt.push_str(&format!(
            "
**Code Context:**
```
{code_context}
```
"
        ));
    }

    prompt.push_str(
        "
Please provide:

1. **Root Cause Analysis**:
   - What is causing this issue?
   - Why is it happening?

2. **Debugging Steps**:
   - How to reproduce the issue
   - What to check or investigate

3. **Solution Options**:
   - Immediate fixes
   - Long-term solutions
   - Alternative approaches

4. **Prevention**:
   - How to prevent similar issues
   - Best practices to follow

5. **Testing Strategy**:
   - How to verify the fix
   - Test cases to add

Please provide specific, actionable recommendations.",
    );
    prompt
}

pub fn code_optimization(code: &str, optimization_goal: &str) -> String {
    format!(
        "Please optimize the following code with a focus on {optimization_goal}:

```
{code}
```

**Optimization Goals:**
- Primary: {optimization_goal}
- Maintain functionality
- Preserve readability (unless readability is the goal)

Please provide:

1. **Analysis of Current Code**:
   - Performance characteristics
   - Resource usage
   - Complexity analysis

2. **Optimization Opportunities**:
   - Specific areas for improvement
   - Algorithmic improvements
   - Data structure optimizations

3. **Optimized Code**:
   - Improved version with explanations
   - Key changes highlighted

4. **Trade-offs**:
   - What was gained vs. what was sacrificed
   - When to use each approach

5. **Benchmarking**:
   - How to measure improvements
   - Expected performance gains

Please provide working, tested code examples."
    )
}

pub fn architecture_review(description: &str, requirements: &str) -> String {
    let mut prompt = format!(
        "Please review the following software architecture:

**Architecture Description:**
{description}
"
    );

    if !requirements.is_empty() {
        prompt.push_str(&format!(
            "
**Requirements:**
{requirements}
"
        ));
    }

    prompt.push_str(
        "
Please analyze and provide feedback on:

1. **Design Principles**:
   - SOLID principles adherence
   - Separation of concerns
   - Single responsibility

2. **Scalability**:
   - Horizontal and vertical scaling
   - Performance bottlenecks
   - Resource utilization

3. **Maintainability**:
   - Code organization
   - Modularity
   - Dependency management

4. **Reliability**:
   - Fault tolerance
   - Error handling
   - Recovery mechanisms

5. **Security**:
   - Security architecture
   - Data protection
   - Access control

6. **Technology Choices**:
   - Technology stack evaluation
   - Tool and framework selection
   - Integration patterns

7. **Recommendations**:
   - Improvement suggestions
   - Alternative approaches
   - Migration strategies

Please provide specific, actionable recommendations with justifications.",
    );
    prompt
}

pub fn code_prompts() -> CapabilityResult<Vec<CapabilityDescriptor>> {
    Ok(vec![
        CapabilityDescriptor::prompt("code_review", |_, args| {
            Ok(Payload::Text(code_review(args.str("code")?, args.str("language")?)))
        })
        .title("Code Review")
        .description("Generate a prompt for comprehensive code review")
        .param(ParamSpec::required("code", ParamType::String).describe("The code to review"))
        .param(
            ParamSpec::optional("language", ParamType::String)
                .with_default("python")
                .describe("Programming language"),
        )
        .build()?,
        CapabilityDescriptor::prompt("bug_analysis", |_, args| {
            Ok(Payload::Text(bug_analysis(
                args.str("error_message")?,
                args.str("code_context")?,
            )))
        })
        .title("Bug Analysis")
        .description("Generate a prompt for bug analysis and debugging")
        .param(
            ParamSpec::required("error_message", ParamType::String)
                .describe("The error message or description"),
        )
        .param(
            ParamSpec::optional("code_context", ParamType::String)
                .with_default("")
                .describe("Code around the failure"),
        )
        .build()?,
        CapabilityDescriptor::prompt("code_optimization", |_, args| {
            Ok(Payload::Text(code_optimization(
                args.str("code")?,
                args.str("optimization_goal")?,
            )))
        })
        .title("Code Optimization")
        .description("Generate a prompt for code optimization")
        .param(ParamSpec::required("code", ParamType::String).describe("The code to optimize"))
        .param(
            ParamSpec::optional("optimization_goal", ParamType::String)
                .with_default("performance")
                .describe("performance, memory or readability"),
        )
        .build()?,
        CapabilityDescriptor::prompt("architecture_review", |_, args| {
            Ok(Payload::Text(architecture_review(
                args.str("description")?,
                args.str("requirements")?,
            )))
        })
        .title("Architecture Review")
        .description("Generate a prompt for software architecture review")
        .param(
            ParamSpec::required("description", ParamType::String)
                .describe("Description of the current architecture"),
        )
        .param(
            ParamSpec::optional("requirements", ParamType::String)
                .with_default("")
                .describe("System requirements and constraints"),
        )
        .build()?,
    ])
}
