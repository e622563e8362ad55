//! Prompt templates for data analysis work.

use capability_hub::{CapabilityDescriptor, CapabilityResult, ParamSpec, ParamType, Payload};

/// Append a labelled section when `body` is non-empty.
fn optional_section(prompt: &mut String, label: &str, body: &str) {
    if !body.is_empty() {
        prompt.push_str(&format!("\n**{label}:**\n{body}\n"));
    }
}

pub fn data_analysis(data_description: &str, analysis_goals: &str) -> String {
    let mut prompt = format!(
        "Please conduct a comprehensive analysis of the following dataset:

**Dataset Description:**
{data_description}
"
    );
    optional_section(&mut prompt, "Analysis Goals", analysis_goals);
    prompt.push_str(
        "
Please provide:

1. **Exploratory Data Analysis (EDA)**:
   - Data structure and types
   - Missing values analysis
   - Basic statistical summaries
   - Data quality assessment

2. **Descriptive Statistics**:
   - Central tendency measures
   - Variability measures
   - Distribution analysis
   - Outlier detection

3. **Data Visualization Recommendations**:
   - Appropriate chart types
   - Key visualizations to create
   - Dashboard design suggestions

4. **Pattern Discovery**:
   - Trends and seasonality
   - Correlations and relationships
   - Anomalies and outliers

5. **Insights and Findings**:
   - Key observations
   - Business implications
   - Actionable recommendations

6. **Next Steps**:
   - Further analysis suggestions
   - Data collection recommendations
   - Model development opportunities

Please provide specific, data-driven insights with supporting evidence.",
    );
    prompt
}

pub fn statistical_analysis(hypothesis: &str, data_info: &str) -> String {
    format!(
        "Please design and conduct a statistical analysis to test the following hypothesis:

**Hypothesis:**
{hypothesis}

**Available Data:**
{data_info}

Please provide:

1. **Hypothesis Formulation**:
   - Null hypothesis (H₀)
   - Alternative hypothesis (H₁)
   - Significance level (α)

2. **Test Selection**:
   - Appropriate statistical test
   - Assumptions and requirements
   - Justification for test choice

3. **Data Preparation**:
   - Data cleaning requirements
   - Sample size considerations
   - Variable transformations

4. **Analysis Plan**:
   - Step-by-step methodology
   - Software/tools recommendations
   - Expected outputs

5. **Interpretation Guidelines**:
   - How to interpret results
   - P-value interpretation
   - Effect size considerations

6. **Reporting Template**:
   - Results presentation format
   - Confidence intervals
   - Practical significance

Please provide a complete analysis framework with code examples where applicable."
    )
}

pub fn predictive_modeling(
    target_variable: &str,
    features_description: &str,
    business_context: &str,
) -> String {
    let mut prompt = format!(
        "Please design a predictive modeling solution for the following scenario:

**Target Variable:**
{target_variable}

**Available Features:**
{features_description}
"
    );
    optional_section(&mut prompt, "Business Context", business_context);
    prompt.push_str(
        "
Please provide:

1. **Problem Definition**:
   - Problem type (regression, classification, etc.)
   - Success metrics
   - Business constraints

2. **Data Strategy**:
   - Feature engineering opportunities
   - Data preprocessing requirements
   - Train/validation/test split strategy

3. **Model Selection**:
   - Candidate algorithms
   - Model complexity considerations
   - Baseline model recommendations

4. **Evaluation Framework**:
   - Appropriate metrics
   - Cross-validation strategy
   - Model comparison approach

5. **Implementation Plan**:
   - Development timeline
   - Resource requirements
   - Deployment considerations

6. **Monitoring and Maintenance**:
   - Model performance tracking
   - Retraining schedule
   - Drift detection

Please provide a comprehensive modeling strategy with practical recommendations.",
    );
    prompt
}

pub fn data_quality_assessment(dataset_info: &str) -> String {
    format!(
        "Please conduct a comprehensive data quality assessment for the following dataset:

**Dataset Information:**
{dataset_info}

Please evaluate and report on:

1. **Completeness**:
   - Missing value analysis
   - Data coverage assessment
   - Completeness by field/time period

2. **Accuracy**:
   - Data validation checks
   - Outlier detection
   - Consistency with business rules

3. **Consistency**:
   - Format standardization
   - Cross-field validation
   - Temporal consistency

4. **Validity**:
   - Data type validation
   - Range and constraint checks
   - Referential integrity

5. **Uniqueness**:
   - Duplicate detection
   - Primary key validation
   - Deduplication strategies

6. **Timeliness**:
   - Data freshness
   - Update frequency
   - Latency analysis

7. **Data Quality Issues**:
   - Identified problems
   - Impact assessment
   - Remediation recommendations

8. **Quality Improvement Plan**:
   - Immediate fixes
   - Process improvements
   - Monitoring framework

Please provide specific, actionable recommendations for improving data quality."
    )
}

pub fn analysis_prompts() -> CapabilityResult<Vec<CapabilityDescriptor>> {
    Ok(vec![
        CapabilityDescriptor::prompt("data_analysis", |_, args| {
            Ok(Payload::Text(data_analysis(
                args.str("data_description")?,
                args.str("analysis_goals")?,
            )))
        })
        .title("Data Analysis")
        .description("Generate a prompt for comprehensive data analysis")
        .param(
            ParamSpec::required("data_description", ParamType::String)
                .describe("Description of the dataset"),
        )
        .param(
            ParamSpec::optional("analysis_goals", ParamType::String)
                .with_default("")
                .describe("Specific analysis objectives"),
        )
        .build()?,
        CapabilityDescriptor::prompt("statistical_analysis", |_, args| {
            Ok(Payload::Text(statistical_analysis(
                args.str("hypothesis")?,
                args.str("data_info")?,
            )))
        })
        .title("Statistical Analysis")
        .description("Generate a prompt for statistical hypothesis testing")
        .param(ParamSpec::required("hypothesis", ParamType::String).describe("The hypothesis to test"))
        .param(
            ParamSpec::required("data_info", ParamType::String)
                .describe("Information about the available data"),
        )
        .build()?,
        CapabilityDescriptor::prompt("predictive_modeling", |_, args| {
            Ok(Payload::Text(predictive_modeling(
                args.str("target_variable")?,
                args.str("features_description")?,
                args.str("business_context")?,
            )))
        })
        .title("Predictive Modeling")
        .description("Generate a prompt for a predictive modeling project")
        .param(
            ParamSpec::required("target_variable", ParamType::String)
                .describe("The variable to predict"),
        )
        .param(
            ParamSpec::required("features_description", ParamType::String)
                .describe("Description of available features"),
        )
        .param(
            ParamSpec::optional("business_context", ParamType::String)
                .with_default("")
                .describe("Business context and requirements"),
        )
        .build()?,
        CapabilityDescriptor::prompt("data_quality_assessment", |_, args| {
            Ok(Payload::Text(data_quality_assessment(args.str("dataset_info")?)))
        })
        .title("Data Quality Assessment")
        .description("Generate a prompt for data quality evaluation")
        .param(
            ParamSpec::required("dataset_info", ParamType::String)
                .describe("Information about the dataset to assess"),
        )
        .build()?,
    ])
}
