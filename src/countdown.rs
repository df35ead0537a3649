use std::convert::Infallible;
use std::io::{self, Write};
use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, Local};
use tracing::{debug, info};

use crate::format_duration;

/// Redraw interval of the progress line.
pub const TICK: StdDuration = StdDuration::from_millis(250);
/// Redraw interval once the end is closer than [`CROSSOVER`] seconds.
pub const FINE_TICK: StdDuration = StdDuration::from_micros(100);
pub const CROSSOVER: f64 = 0.250;

/// Erases the current terminal line and returns to its start.
pub const CLEAR: &str = "\x1b[2K\r";

pub fn format_eta(end: &DateTime<Local>, now: &DateTime<Local>) -> String {
    let end_date = end.date_naive();
    let now_date = now.date_naive();

    if end_date == now_date {
        end.format("%H:%M:%S").to_string()
    } else if end_date.year() == now_date.year() {
        end.format("%m-%d %H:%M:%S").to_string()
    } else {
        end.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

pub fn render_line(elapsed: f64, target: f64, eta: &str) -> String {
    format!(
        "{} elapsed | {} remaining | ETA {}",
        format_duration(elapsed),
        format_duration((target - elapsed).max(0.0)),
        eta
    )
}

fn seconds_since(start: &DateTime<Local>) -> f64 {
    (Local::now() - *start).num_milliseconds().max(0) as f64 / 1000.0
}

fn redraw<W: Write>(out: &mut W, line: &str, tick: StdDuration) -> io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.flush()?;
    // thread::sleep resumes after EINTR with the time still left
    thread::sleep(tick);
    out.write_all(CLEAR.as_bytes())
}

fn redraw_until<W, F>(
    out: &mut W,
    start: &DateTime<Local>,
    stop: f64,
    tick: StdDuration,
    line: F,
) -> io::Result<()>
where
    W: Write,
    F: Fn(f64) -> String,
{
    let mut elapsed = seconds_since(start);
    while elapsed < stop {
        redraw(out, &line(elapsed), tick)?;
        elapsed = seconds_since(start);
    }
    Ok(())
}

/// Blocks for `target` seconds while redrawing elapsed and remaining time on
/// a single line of `out`, then writes the total elapsed time on its own line.
///
/// Redraws every [`TICK`] until the last [`CROSSOVER`] seconds, which are
/// paced with [`FINE_TICK`] so the wait does not overshoot by a whole tick.
/// Returns the elapsed seconds.
pub fn countdown<W: Write>(out: &mut W, target: f64) -> io::Result<f64> {
    let start = Local::now();
    let end = start + Duration::milliseconds((target * 1000.0) as i64);
    debug!(target_secs = target, eta = %format_eta(&end, &start), "countdown started");

    let line = |elapsed| render_line(elapsed, target, &format_eta(&end, &Local::now()));
    redraw_until(out, &start, target - CROSSOVER, TICK, line)?;
    debug!("entering fine tick window");
    redraw_until(out, &start, target, FINE_TICK, line)?;

    let elapsed = seconds_since(&start);
    writeln!(out, "{}", format_duration(elapsed))?;
    out.flush()?;
    info!(elapsed_secs = elapsed, "countdown finished");
    Ok(elapsed)
}

/// Redraws the elapsed time forever. Only returns when writing to `out`
/// fails.
pub fn count_up<W: Write>(out: &mut W) -> io::Result<Infallible> {
    let start = Local::now();
    info!("no bound given, counting up until interrupted");
    loop {
        let line = format!("{} elapsed", format_duration(seconds_since(&start)));
        redraw(out, &line, TICK)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_token;
    use chrono::TimeZone;
    use std::time::Instant;

    fn make_dt(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, h, m, s).unwrap()
    }

    #[test]
    fn test_format_eta_same_day() {
        let now = make_dt(2026, 2, 20, 10, 0, 0);
        let end = make_dt(2026, 2, 20, 14, 30, 45);
        assert_eq!(format_eta(&end, &now), "14:30:45");
    }

    #[test]
    fn test_format_eta_next_day_same_year() {
        let now = make_dt(2026, 2, 20, 10, 0, 0);
        let end = make_dt(2026, 2, 21, 8, 0, 0);
        assert_eq!(format_eta(&end, &now), "02-21 08:00:00");
    }

    #[test]
    fn test_format_eta_year_boundary() {
        let now = make_dt(2026, 12, 31, 23, 0, 0);
        let end = make_dt(2027, 1, 1, 0, 0, 0);
        assert_eq!(format_eta(&end, &now), "2027-01-01 00:00:00");
    }

    #[test]
    fn test_render_line() {
        assert_eq!(
            render_line(61.5, 3600.0, "10:00:00"),
            "00d 00h 01m 01.500s elapsed | 00d 00h 58m 58.500s remaining | ETA 10:00:00"
        );
    }

    #[test]
    fn test_render_line_never_negative() {
        let line = render_line(2.1, 2.0, "10:00:00");
        assert!(line.contains("00d 00h 00m 00.000s remaining"));
        assert!(!line.contains('-'));
    }

    #[test]
    fn test_countdown_zero_target() {
        let mut out = Vec::new();
        let start = Instant::now();
        let elapsed = countdown(&mut out, 0.0).unwrap();
        assert!(start.elapsed() < StdDuration::from_millis(100));
        assert!(elapsed < 0.1);
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains(CLEAR));
        assert!(text.ends_with("s\n"));
    }

    #[test]
    fn test_countdown_runs_for_target() {
        let mut out = Vec::new();
        let start = Instant::now();
        let elapsed = countdown(&mut out, 0.6).unwrap();
        let wall = start.elapsed();

        assert!(elapsed >= 0.6);
        assert!(wall >= StdDuration::from_millis(600));
        assert!(wall < StdDuration::from_millis(600) + TICK * 2);

        let text = String::from_utf8(out).unwrap();
        let frames: Vec<&str> = text.split(CLEAR).collect();
        assert!(frames.len() > 2);
        let (summary, lines) = frames.split_last().unwrap();
        for line in lines {
            let (times, _eta) = line.split_once(" | ETA ").unwrap();
            assert!(times.ends_with(" remaining"));
            assert!(!times.contains('-'));
        }

        assert!(summary.ends_with('\n'));
        assert!(parse_token(summary.trim_end()).unwrap() >= 0.6);
    }

    struct FailAfter {
        writes_left: usize,
        written: Vec<u8>,
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.writes_left == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.writes_left -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_count_up_shows_elapsed_only() {
        let mut out = FailAfter {
            writes_left: 4,
            written: Vec::new(),
        };
        let err = count_up(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let text = String::from_utf8(out.written).unwrap();
        let frames: Vec<&str> = text.split(CLEAR).filter(|f| !f.is_empty()).collect();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].starts_with("00d 00h 00m 00."));
        assert!(frames.iter().all(|f| f.ends_with("s elapsed")));
        assert!(!text.contains("remaining"));
    }
}
