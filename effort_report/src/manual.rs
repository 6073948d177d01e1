/*!

This is the long-form manual for `effort_report` and `effortview`.

## Response formats

The estimation service reports the estimate of each model under the
`model_estimates` key, either at the top level of the response or inside an
`estimation` object. Three shapes are accepted, and they can be mixed in one
response.

### Legacy numeric

The value is the effort itself, in person-months:

```text
{"cocomo": 12.5}
```

### Nested object

```text
{"ml_ensemble": {"estimate": 8, "confidence": 86, "name": "ML Ensemble"}}
```

The effort is read from `effort`, then `estimate`, then `effort_pm`. A field
that is present but not a number is skipped. The other fields are `name`,
`confidence`, `type` and `description`.

### Split metadata

The metadata is carried by sibling keys:

```text
{"cocomo": 12.5, "cocomo_name": "COCOMO II", "cocomo_confidence": 75}
```

Keys ending with `_name`, `_confidence`, `_type` or `_description` never
become models of their own. When a field is given both in a nested object and
in a sibling key, the nested field wins.

### Confidence

Confidences are percentages. Machine learning models (keys starting with
`ml_`) sometimes report them multiplied by 100: such values above 100 are
divided by 100 once. All the confidences are then clamped to [0, 100].

### Model types

When the type is not given, it is inferred from the key. The first matching
rule wins:

| key                        | type            | color  |
|----------------------------|-----------------|--------|
| contains `cocomo`          | COCOMO          | blue   |
| contains `function_points` | Function Points | green  |
| contains `use_case`        | Use Case        | purple |
| contains `loc`             | LOC             | orange |
| starts with `ml_`          | ML              | red    |
| anything else              | Other           | blue   |

## Uploads

Documents must be at most 10MB, with one of the extensions `txt`, `doc`,
`docx`, `pdf` or `md`. Other files are rejected before anything is sent.

## Task lists

`effortview --tasks` reads a JSON, CSV or Excel file. The JSON form is either
an array of tasks or an object with a `tasks` array:

```text
{"tasks": [{"title": "Login page", "priority": "High", "complexity": "Medium"}]}
```

The CSV and Excel forms have a header row with the columns `title`,
`description`, `priority` and `complexity`, in any order. All columns are
optional. Missing titles are numbered (`Task 1`, `Task 2`, ...) and missing
levels default to `Medium`.

Levels are case-insensitive. The priorities used by the task generator are
accepted too: `critical` and `blocker` are high, `major` is medium, `minor`
and `trivial` are low.

## Task generation

`effortview --generate-tasks` asks the service to break the requirements
(`--text`, `--text-file` or `--upload`) into tasks, with a title, a type, a
priority, a domain, story points, a role, a description and acceptance
criteria. The answer is an object with a `tasks` array; a missing array means
that no task was found.

`--export-tasks tasks.csv` (or `tasks.json`) writes the tasks down, and the
file can be estimated with `--tasks`. Such files have story points instead of
a complexity: more than 8 points is a high complexity, more than 3 is medium,
and the rest is low.

## Configuration

`effortview` comes with sensible defaults. A configuration file in JSON can
change them, and the command line overrides the file:

```text
{
  "apiUrl": "http://localhost:8000",
  "method": "weighted_average",
  "timeoutSeconds": 60,
  "chartScale": "log",
  "chartWidth": 40,
  "color": true
}
```

 */
