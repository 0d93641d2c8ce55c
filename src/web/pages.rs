//! Server-rendered pages: the club front page and the CSV upload forms.

use axum::{extract::State, response::Html};

use super::SharedState;

const CLUB_PLACEHOLDER: &str = "{{CLUB_NAME}}";

/// Escape text for use inside HTML element content or a quoted attribute.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn with_club_name(template: &str, club_name: &str) -> Html<String> {
    Html(template.replace(CLUB_PLACEHOLDER, &escape_html(club_name)))
}

/// A bare upload form posting a single `file` field back to `action`.
fn upload_form(club_name: &str, title: &str, action: &str) -> Html<String> {
    let page = UPLOAD_HTML
        .replace("{{TITLE}}", title)
        .replace("{{ACTION}}", action);
    with_club_name(&page, club_name)
}

/// GET /
pub(super) async fn index_handler(State(state): State<SharedState>) -> Html<String> {
    with_club_name(INDEX_HTML, &state.club_name)
}

/// GET /import
pub(super) async fn import_games_form(State(state): State<SharedState>) -> Html<String> {
    upload_form(&state.club_name, "개인전 기록 가져오기", "/import")
}

/// GET /import_tournament
pub(super) async fn import_tournament_form(State(state): State<SharedState>) -> Html<String> {
    upload_form(&state.club_name, "대회 기록 가져오기", "/import_tournament")
}

/// GET /import_badges
pub(super) async fn import_badges_form(State(state): State<SharedState>) -> Html<String> {
    upload_form(&state.club_name, "뱃지 목록 가져오기", "/import_badges")
}

/// GET /import_player_badges
pub(super) async fn import_player_badges_form(State(state): State<SharedState>) -> Html<String> {
    upload_form(&state.club_name, "뱃지 부여 기록 가져오기", "/import_player_badges")
}

const UPLOAD_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{CLUB_NAME}} · {{TITLE}}</title>
<style>
  body { background: #f6f4ee; color: #222; font-family: system-ui, sans-serif; padding: 2rem; }
  form { background: #fff; border: 1px solid #ddd; border-radius: 10px; padding: 1.5rem; max-width: 28rem; display: grid; gap: 1rem; }
  button { padding: .5rem 1rem; border-radius: 6px; border: 1px solid #2e7d4f; background: #2e7d4f; color: #fff; cursor: pointer; }
  .hint { color: #777; font-size: .85rem; }
</style>
</head>
<body>
<h1>{{TITLE}}</h1>
<form method="post" action="{{ACTION}}" enctype="multipart/form-data">
  <input type="file" name="file" accept=".csv,text/csv" required>
  <p class="hint">UTF-8 또는 CP949(엑셀) CSV, 쉼표 또는 세미콜론 구분</p>
  <button type="submit">업로드</button>
</form>
<p><a href="/">← {{CLUB_NAME}}</a></p>
</body>
</html>
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{CLUB_NAME}} 마작 기록</title>
<style>
  :root {
    --bg: #f6f4ee;
    --card: #ffffff;
    --border: #ddd8cc;
    --accent: #2e7d4f;
    --plus: #1b7f4b;
    --minus: #c0392b;
    --muted: #777;
  }
  * { box-sizing: border-box; }
  body { margin: 0; background: var(--bg); color: #222; font-family: system-ui, sans-serif; }
  header { display: flex; align-items: baseline; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); background: var(--card); }
  header h1 { margin: 0; font-size: 1.4rem; }
  header nav { margin-left: auto; display: flex; gap: .8rem; font-size: .85rem; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
  .panel h2 { margin: 0; padding: .8rem 1.2rem; font-size: 1rem; border-bottom: 1px solid var(--border); }
  .panel .body { padding: 1rem 1.2rem; }
  table { width: 100%; border-collapse: collapse; }
  th, td { padding: .5rem .8rem; text-align: left; font-size: .88rem; border-bottom: 1px solid #eee; }
  th { color: var(--muted); font-size: .75rem; }
  .plus { color: var(--plus); }
  .minus { color: var(--minus); }
  .seats { display: grid; grid-template-columns: repeat(4, 1fr); gap: .6rem; }
  .seats input { width: 100%; padding: .4rem; }
  .two-col { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
  @media (max-width: 768px) { .two-col, .seats { grid-template-columns: 1fr; } }
  .empty { color: var(--muted); text-align: center; padding: 1.5rem; }
  #entry-error { color: var(--minus); min-height: 1.2em; }
</style>
</head>
<body>
<header>
  <h1>{{CLUB_NAME}} 마작 기록</h1>
  <span id="rules" style="color:var(--muted);font-size:.8rem;"></span>
  <nav>
    <a href="/export">개인전 CSV</a>
    <a href="/export_tournament">대회 CSV</a>
    <a href="/export_badges">뱃지 CSV</a>
    <a href="/export_player_badges">뱃지 부여 CSV</a>
    <a href="/import">개인전 가져오기</a>
    <a href="/import_tournament">대회 가져오기</a>
  </nav>
</header>

<main>
  <section class="panel">
    <h2>대국 입력</h2>
    <div class="body">
      <form id="entry">
        <div class="seats">
          <input name="player1_name" placeholder="동 이름"><input name="player2_name" placeholder="남 이름">
          <input name="player3_name" placeholder="서 이름"><input name="player4_name" placeholder="북 이름">
          <input name="player1_score" type="number" step="100" placeholder="점수"><input name="player2_score" type="number" step="100" placeholder="점수">
          <input name="player3_score" type="number" step="100" placeholder="점수"><input name="player4_score" type="number" step="100" placeholder="점수">
        </div>
        <p id="entry-error"></p>
        <button type="submit">저장</button>
      </form>
    </div>
  </section>

  <div class="two-col">
    <section class="panel">
      <h2>개인 랭킹</h2>
      <table>
        <thead><tr><th>#</th><th>이름</th><th>대국</th><th>총 pt</th><th>평균</th><th>연대율</th></tr></thead>
        <tbody id="ranking"><tr><td colspan="6" class="empty">불러오는 중…</td></tr></tbody>
      </table>
    </section>
    <section class="panel">
      <h2>최근 대국</h2>
      <table>
        <thead><tr><th>시간</th><th>동</th><th>남</th><th>서</th><th>북</th><th></th></tr></thead>
        <tbody id="games"><tr><td colspan="6" class="empty">불러오는 중…</td></tr></tbody>
      </table>
    </section>
  </div>

  <section class="panel">
    <h2>대회 아카이브</h2>
    <div class="body">
      <form method="post" action="/admin/archive_import" enctype="multipart/form-data">
        <input name="archive_name" placeholder="예: 2025년 3월 대회" required>
        <input type="file" name="file" accept=".csv,text/csv" required>
        <button type="submit">아카이브 만들기</button>
      </form>
      <ul id="archives"></ul>
    </div>
  </section>
</main>

<script>
const esc = s => String(s).replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
const signed = v => `<span class="${v >= 0 ? 'plus' : 'minus'}">${v >= 0 ? '+' : ''}${v.toFixed(1)}</span>`;

async function getJson(url) {
  const res = await fetch(url);
  if (!res.ok) throw new Error(`${url}: ${res.status}`);
  return res.json();
}

async function loadConfig() {
  const cfg = await getJson('/api/config');
  document.getElementById('rules').textContent =
    `우마 ${cfg.uma.join('/')} · 반환점 ${cfg.return_score} · 합계 ${cfg.table_total}`;
}

async function loadRanking() {
  const rows = await getJson('/api/ranking');
  const body = document.getElementById('ranking');
  body.innerHTML = rows.length ? rows.map((r, i) => `<tr>
    <td>${i + 1}</td><td>${esc(r.name)}</td><td>${r.games}</td>
    <td>${signed(r.total_pt)}</td><td>${signed(r.avg_pt)}</td><td>${r.top_two_rate.toFixed(1)}%</td>
  </tr>`).join('') : '<tr><td colspan="6" class="empty">기록 없음</td></tr>';
}

async function loadGames() {
  const games = (await getJson('/api/games')).slice(0, 20);
  const body = document.getElementById('games');
  const seat = (g, n) => `${esc(g['player' + n + '_name'])} ${g['player' + n + '_score']}`;
  body.innerHTML = games.length ? games.map(g => `<tr>
    <td>${esc(g.created_at)}</td><td>${seat(g, 1)}</td><td>${seat(g, 2)}</td><td>${seat(g, 3)}</td><td>${seat(g, 4)}</td>
    <td><button data-id="${g.id}" class="delete">삭제</button></td>
  </tr>`).join('') : '<tr><td colspan="6" class="empty">기록 없음</td></tr>';
}

async function loadArchives() {
  const list = await getJson('/api/archives');
  document.getElementById('archives').innerHTML = list
    .map(a => `<li>${esc(a.name)} (${a.game_count}국, ${esc(a.created_at)})</li>`).join('');
}

async function refresh() {
  try {
    await Promise.all([loadRanking(), loadGames(), loadArchives()]);
  } catch (e) {
    console.error(e);
  }
}

document.getElementById('entry').addEventListener('submit', async ev => {
  ev.preventDefault();
  const payload = Object.fromEntries(new FormData(ev.target));
  const res = await fetch('/api/games', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(payload),
  });
  const out = await res.json();
  document.getElementById('entry-error').textContent = res.ok ? '' : out.error;
  if (res.ok) { ev.target.reset(); refresh(); }
});

document.getElementById('games').addEventListener('click', async ev => {
  const id = ev.target.dataset && ev.target.dataset.id;
  if (!id || !confirm('이 대국을 삭제할까요?')) return;
  await fetch(`/api/games/${id}`, { method: 'DELETE' });
  refresh();
});

loadConfig().catch(console.error);
refresh();
</script>
</body>
</html>
"#;
