use crate::date_key::date_key;
use crate::models::{DayView, SeriesResponse};
use chrono::{Datelike, NaiveDate};

/// Selectable range plus the day whose month the calendar strip shows.
#[derive(Debug, Clone, Copy)]
pub struct CalendarBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub month: NaiveDate,
}

pub fn render_index(bounds: &CalendarBounds, day: Option<&DayView>, chart: &SeriesResponse) -> String {
    let (selected, day_panel) = match day {
        Some(day) => (day.date.as_str(), render_day(day)),
        None => ("", NO_DAY_HTML.to_string()),
    };

    let chart_json = serde_json::to_string(chart)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    INDEX_HTML
        .replace("{{MIN_DATE}}", &date_key(bounds.min))
        .replace("{{MAX_DATE}}", &date_key(bounds.max))
        .replace("{{SELECTED}}", &escape_html(selected))
        .replace("{{MONTH}}", &render_month(bounds, selected))
        .replace("{{CHART_JSON}}", &chart_json)
        .replace("{{DAY_PANEL}}", &day_panel)
}

fn render_month(bounds: &CalendarBounds, selected: &str) -> String {
    let month = bounds.month;
    let Some(first) = month.with_day(1) else {
        return String::new();
    };

    let mut cells = String::new();
    for date in first.iter_days().take_while(|date| date.month() == month.month()) {
        let key = date_key(date);
        let class = if key == selected { "day-cell selected" } else { "day-cell" };
        let disabled = if date < bounds.min || date > bounds.max {
            " disabled"
        } else {
            ""
        };
        cells.push_str(&format!(
            r#"<button class="{class}" type="submit" name="date" value="{key}"{disabled}>{day}</button>"#,
            day = date.day(),
        ));
    }

    format!(
        r#"<form class="month" method="post" action="/select">
      <span class="month-label">{label}</span>
      <div class="month-days">{cells}</div>
    </form>"#,
        label = first.format("%B %Y"),
    )
}

fn render_day(day: &DayView) -> String {
    let date = escape_html(&day.date);
    let mut items = String::new();
    for (index, task) in day.tasks.iter().enumerate() {
        let checked = if task.completed { " checked" } else { "" };
        let done = if task.completed { " done" } else { "" };
        items.push_str(&format!(
            r#"<li class="task{done}">
          <form method="post" action="/tasks/toggle">
            <input type="hidden" name="date" value="{date}" />
            <input type="hidden" name="index" value="{index}" />
            <label><input type="checkbox" class="toggle"{checked} /> {text}</label>
            <noscript><button class="btn-small" type="submit">Toggle</button></noscript>
          </form>
        </li>"#,
            text = escape_html(&task.text),
        ));
    }
    if items.is_empty() {
        items.push_str(r#"<li class="empty">No tasks yet for this day.</li>"#);
    }

    DAY_HTML
        .replace("{{DATE}}", &date)
        .replace("{{SCORE}}", &day.score_display.to_string())
        .replace("{{COUNT}}", &day.tasks.len().to_string())
        .replace("{{TASKS}}", &items)
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const NO_DAY_HTML: &str = r#"<section class="day">
      <p class="subtitle">Pick a day on the calendar to plan its tasks.</p>
    </section>"#;

const DAY_HTML: &str = r#"<section class="day">
      <div class="panel">
        <div class="stat">
          <span class="label">Day</span>
          <span class="value">{{DATE}}</span>
        </div>
        <div class="stat">
          <span class="label">Tasks</span>
          <span class="value">{{COUNT}}</span>
        </div>
        <div class="stat">
          <span class="label">Progress</span>
          <span class="value score">{{SCORE}}%</span>
        </div>
      </div>
      <form class="row" method="post" action="/tasks">
        <input type="text" name="text" placeholder="Enter task" autocomplete="off" />
        <button class="btn-primary" type="submit">Add Task</button>
      </form>
      <ul class="tasks">
        {{TASKS}}
      </ul>
    </section>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Progress</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #4bc0c0;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    .row input {
      flex: 1;
      min-width: 180px;
      padding: 12px 16px;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      font-size: 1rem;
    }

    .month {
      display: grid;
      gap: 10px;
    }

    .month-label {
      font-weight: 600;
      color: var(--accent-2);
    }

    .month-days {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
    }

    .day-cell {
      padding: 8px 0;
      border-radius: 12px;
      background: white;
      color: var(--accent-2);
      border: 1px solid rgba(47, 72, 88, 0.12);
    }

    .day-cell.selected {
      background: var(--accent);
      color: white;
    }

    .day-cell:disabled {
      opacity: 0.35;
      cursor: default;
    }

    .day {
      display: grid;
      gap: 18px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.score {
      color: var(--accent);
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: var(--accent-2);
    }

    .btn-primary {
      background: var(--accent);
    }

    .btn-small {
      padding: 4px 12px;
      font-size: 0.8rem;
    }

    .tasks {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .task form {
      display: flex;
      align-items: center;
      justify-content: space-between;
      background: white;
      border-radius: 14px;
      padding: 12px 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .task.done label {
      text-decoration: line-through;
      color: #8b857d;
    }

    .empty {
      color: #8b857d;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    #chart {
      width: 100%;
      height: 280px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Daily Progress</h1>
      <p class="subtitle">Plan each day as a checklist; the score is the share of tasks done.</p>
    </header>

    <form id="select-form" class="row" method="post" action="/select">
      <input type="date" id="date-input" name="date" min="{{MIN_DATE}}" max="{{MAX_DATE}}" value="{{SELECTED}}" required />
      <button type="submit">Open day</button>
    </form>

    {{MONTH}}

    {{DAY_PANEL}}

    <section>
      <h2 id="chart-title">Daily Progress</h2>
      <div class="chart-card">
        <svg id="chart" viewBox="0 0 600 280" aria-label="Daily progress chart" role="img"></svg>
      </div>
    </section>
  </main>

  <script id="chart-data" type="application/json">{{CHART_JSON}}</script>
  <script>
    const chartEl = document.getElementById('chart');
    const series = JSON.parse(document.getElementById('chart-data').textContent);

    document.getElementById('date-input').addEventListener('change', (event) => {
      if (event.target.value) {
        event.target.form.submit();
      }
    });

    document.querySelectorAll('.toggle').forEach((box) => {
      box.addEventListener('change', () => box.form.submit());
    });

    const renderLineChart = (chart) => {
      if (!chart || !chart.labels.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const width = 600;
      const height = 280;
      const paddingX = 44;
      const paddingY = 34;
      const top = 20;
      const min = chart.y_min;
      const max = chart.y_max;
      const count = chart.labels.length;

      const xStep = count > 1 ? (width - paddingX * 2) / (count - 1) : 0;
      const scaleY = (height - top - paddingY) / (max - min);
      const x = (index) => paddingX + index * xStep;
      const y = (value) => height - paddingY - (value - min) * scaleY;

      let grid = '';
      for (let value = min; value <= max; value += chart.step) {
        const yPos = y(value);
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 10}" y="${yPos + 4}" text-anchor="end">${value}</text>`;
      }

      const path = chart.data
        .map((value, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(value).toFixed(2)}`)
        .join(' ');

      const circles = chart.data
        .map((value, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(value)}" r="4"><title>${chart.labels[index]}: ${Math.round(value)}%</title></circle>`)
        .join('');

      const labelEvery = Math.max(1, Math.ceil(count / 8));
      const xLabels = chart.labels
        .map((label, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          return `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${label.slice(5)}</text>`;
        })
        .join('');

      document.getElementById('chart-title').textContent = chart.label;
      chartEl.innerHTML = `
        ${grid}
        <path class="chart-line" d="${path}" />
        ${circles}
        ${xLabels}
      `;
    };

    renderLineChart(series);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn chart() -> SeriesResponse {
        SeriesResponse {
            label: "Daily Progress".to_string(),
            labels: vec!["2024-07-17".to_string()],
            data: vec![0.0],
            y_min: 0,
            y_max: 100,
            step: 10,
        }
    }

    fn bounds(month: NaiveDate) -> CalendarBounds {
        CalendarBounds {
            min: NaiveDate::from_ymd_opt(2024, 7, 17).unwrap(),
            max: NaiveDate::from_ymd_opt(2034, 7, 20).unwrap(),
            month,
        }
    }

    #[test]
    fn task_text_is_escaped() {
        let day = DayView {
            date: "2024-07-17".to_string(),
            tasks: vec![Task::new("<script>alert(1)</script>")],
            score: 0.0,
            score_display: 0,
        };
        let month = NaiveDate::from_ymd_opt(2024, 7, 17).unwrap();
        let html = render_index(&bounds(month), Some(&day), &chart());

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains(r#"min="2024-07-17""#));
        assert!(html.contains(r#"max="2034-07-20""#));
    }

    #[test]
    fn no_selection_prompts_for_a_day() {
        let month = NaiveDate::from_ymd_opt(2024, 8, 3).unwrap();
        let html = render_index(&bounds(month), None, &chart());
        assert!(html.contains("Pick a day"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn month_strip_lists_every_day_and_blocks_early_ones() {
        let month = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();
        let html = render_month(&bounds(month), "2024-07-20");

        assert!(html.contains("July 2024"));
        assert_eq!(html.matches(r#"name="date""#).count(), 31);
        assert!(html.contains(r#"value="2024-07-16" disabled>16<"#));
        assert!(html.contains(r#"value="2024-07-17">17<"#));
        assert!(html.contains(r#"class="day-cell selected" type="submit" name="date" value="2024-07-20""#));
        assert!(!html.contains("2024-08-01"));
    }

    #[test]
    fn month_strip_handles_leap_february() {
        let month = NaiveDate::from_ymd_opt(2028, 2, 10).unwrap();
        let html = render_month(&bounds(month), "");
        assert_eq!(html.matches(r#"name="date""#).count(), 29);
        assert!(!html.contains("disabled"));
    }
}
