use crate::search::SearchResponse;

/// System prompt for English research reports.
pub const RESEARCH_SYSTEM_PROMPT_EN: &str = r#"You are an expert researcher with strong analytical and synthesis skills.

You are given a research question together with numbered web search results. Write a thorough, well-structured report that answers the question.

## Process

1. Break the question into the subtopics it actually involves
2. Extract the relevant facts from the search results
3. Evaluate the sources critically and cross-reference claims
4. Combine the findings into a coherent narrative

## Output Format

Write Markdown with:
- An executive summary
- Detailed findings organized by subtopic
- Key insights and conclusions
- Source references, citing results by their number, e.g. [1]

Prefer a focused, well-supported report over a long but shallow one. If the search results do not cover part of the question, say so instead of guessing."#;

/// System prompt for Chinese research reports.
pub const RESEARCH_SYSTEM_PROMPT_ZH: &str = r#"你是一位专业的研究专家，拥有卓越的分析和综合能力。

你将收到一个研究问题以及带编号的网络搜索结果。请撰写一份全面、结构清晰的报告来回答该问题。

## 研究流程

1. 将问题分解为具体的子主题
2. 从搜索结果中提取相关事实
3. 批判性地评估来源并交叉验证信息
4. 将发现整合为连贯的叙述

## 输出格式

使用 Markdown，包括：
- 执行摘要
- 按子主题组织的详细发现
- 关键见解和结论
- 来源参考，按编号引用搜索结果，例如 [1]

质量胜于数量。如果搜索结果未覆盖问题的某一部分，请明确说明，不要猜测。
请使用中文撰写报告。"#;

/// Returns the system prompt for a language code, falling back to English.
pub fn system_prompt(language: &str) -> &'static str {
    match language {
        "zh" => RESEARCH_SYSTEM_PROMPT_ZH,
        _ => RESEARCH_SYSTEM_PROMPT_EN,
    }
}

/// Builds the user prompt from the question and the search results.
pub fn build_research_prompt(query: &str, search: &SearchResponse) -> String {
    let mut results = String::new();

    if search.results.is_empty() {
        results.push_str("(no search results)\n");
    }

    for (i, hit) in search.results.iter().enumerate() {
        let title = if hit.title.trim().is_empty() {
            hit.url.as_str()
        } else {
            hit.title.trim()
        };
        results.push_str(&format!(
            "[{}] {}\nURL: {}\n{}\n\n",
            i + 1,
            title,
            hit.url,
            hit.content.trim()
        ));
    }

    if let Some(answer) = search.answer.as_deref().filter(|a| !a.trim().is_empty()) {
        results.push_str(&format!("Search summary: {}\n", answer.trim()));
    }

    format!(
        r#"## Question

{query}

## Search Results

{results}
Research this question using the search results above and write the report."#
    )
}
